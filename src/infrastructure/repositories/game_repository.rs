//! Game Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Game, GameRepository, GameStatus};
use crate::shared::error::AppError;

const GAME_COLUMNS: &str = "id, name, description, category, platform, status, image_url, \
     website_url, requirements, has_roles, available_roles, available_ranks, created_at, \
     updated_at";

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    id: i64,
    name: String,
    description: Option<String>,
    category: Option<String>,
    platform: Option<String>,
    status: String,
    image_url: Option<String>,
    website_url: Option<String>,
    requirements: Option<String>,
    has_roles: bool,
    available_roles: Vec<String>,
    available_ranks: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GameRow {
    fn into_game(self) -> Game {
        Game {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            platform: self.platform,
            status: GameStatus::from_str(&self.status),
            image_url: self.image_url,
            website_url: self.website_url,
            requirements: self.requirements,
            has_roles: self.has_roles,
            available_roles: self.available_roles,
            available_ranks: self.available_ranks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL game repository implementation.
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Game>, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!(
            "SELECT {} FROM games WHERE id = $1",
            GAME_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_game()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Game>, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!(
            "SELECT {} FROM games WHERE name = $1",
            GAME_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_game()))
    }

    async fn find_all(&self) -> Result<Vec<Game>, AppError> {
        let rows = sqlx::query_as::<_, GameRow>(&format!(
            "SELECT {} FROM games ORDER BY name",
            GAME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_game()).collect())
    }

    async fn create(&self, game: &Game) -> Result<Game, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!(
            "INSERT INTO games (name, description, category, platform, status, image_url, \
             website_url, requirements, has_roles, available_roles, available_ranks) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(&game.name)
        .bind(&game.description)
        .bind(&game.category)
        .bind(&game.platform)
        .bind(game.status.as_str())
        .bind(&game.image_url)
        .bind(&game.website_url)
        .bind(&game.requirements)
        .bind(game.has_roles)
        .bind(&game.available_roles)
        .bind(&game.available_ranks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Game name already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_game())
    }

    async fn update(&self, game: &Game) -> Result<Game, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!(
            "UPDATE games SET name = $2, description = $3, category = $4, platform = $5, \
             status = $6, image_url = $7, website_url = $8, requirements = $9, has_roles = $10, \
             available_roles = $11, available_ranks = $12, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(game.id)
        .bind(&game.name)
        .bind(&game.description)
        .bind(&game.category)
        .bind(&game.platform)
        .bind(game.status.as_str())
        .bind(&game.image_url)
        .bind(&game.website_url)
        .bind(&game.requirements)
        .bind(game.has_roles)
        .bind(&game.available_roles)
        .bind(&game.available_ranks)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game with id {} not found", game.id)))?;

        Ok(row.into_game())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game with id {} not found", id)));
        }

        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result)
    }
}
