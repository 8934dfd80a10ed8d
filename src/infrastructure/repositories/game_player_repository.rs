//! Player Listing Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{GamePlayer, GamePlayerRepository, PlayerStats, PlayerSummary};
use crate::shared::error::AppError;

const PLAYER_COLUMNS: &str = "id, user_id, game_id, nickname, description, rank, roles, \
     hourly_rate, available, hire_count, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct GamePlayerRow {
    id: i64,
    user_id: i64,
    game_id: i64,
    nickname: String,
    description: Option<String>,
    rank: Option<String>,
    roles: Vec<String>,
    hourly_rate: i64,
    available: bool,
    hire_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GamePlayerRow {
    fn into_player(self) -> GamePlayer {
        GamePlayer {
            id: self.id,
            user_id: self.user_id,
            game_id: self.game_id,
            nickname: self.nickname,
            description: self.description,
            rank: self.rank,
            roles: self.roles,
            hourly_rate: self.hourly_rate,
            available: self.available,
            hire_count: self.hire_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    total_reviews: i64,
    total_revenue: i64,
    rating: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    nickname: String,
    email: String,
    total_orders: i64,
    total_reviews: i64,
    total_revenue: i64,
    available: bool,
    rank: Option<String>,
    rating: Option<f64>,
    game_name: String,
    avatar_url: Option<String>,
}

/// PostgreSQL player listing repository implementation.
#[derive(Clone)]
pub struct PgGamePlayerRepository {
    pool: PgPool,
}

impl PgGamePlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GamePlayerRepository for PgGamePlayerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<GamePlayer>, AppError> {
        let row = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "SELECT {} FROM game_players WHERE id = $1",
            PLAYER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_player()))
    }

    async fn find_by_game(&self, game_id: i64) -> Result<Vec<GamePlayer>, AppError> {
        let rows = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "SELECT {} FROM game_players WHERE game_id = $1 ORDER BY hire_count DESC",
            PLAYER_COLUMNS
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_player()).collect())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<GamePlayer>, AppError> {
        let rows = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "SELECT {} FROM game_players WHERE user_id = $1 ORDER BY created_at",
            PLAYER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_player()).collect())
    }

    async fn find_by_user_and_game(
        &self,
        user_id: i64,
        game_id: i64,
    ) -> Result<Option<GamePlayer>, AppError> {
        let row = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "SELECT {} FROM game_players WHERE user_id = $1 AND game_id = $2",
            PLAYER_COLUMNS
        ))
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_player()))
    }

    async fn create(&self, player: &GamePlayer) -> Result<GamePlayer, AppError> {
        let row = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "INSERT INTO game_players (user_id, game_id, nickname, description, rank, roles, \
             hourly_rate, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(player.user_id)
        .bind(player.game_id)
        .bind(&player.nickname)
        .bind(&player.description)
        .bind(&player.rank)
        .bind(&player.roles)
        .bind(player.hourly_rate)
        .bind(player.available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A listing for this game already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_player())
    }

    async fn update(&self, player: &GamePlayer) -> Result<GamePlayer, AppError> {
        let row = sqlx::query_as::<_, GamePlayerRow>(&format!(
            "UPDATE game_players SET nickname = $2, description = $3, rank = $4, roles = $5, \
             hourly_rate = $6, available = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(player.id)
        .bind(&player.nickname)
        .bind(&player.description)
        .bind(&player.rank)
        .bind(&player.roles)
        .bind(player.hourly_rate)
        .bind(player.available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing with id {} not found", player.id)))?;

        Ok(row.into_player())
    }

    async fn count_by_game(&self, game_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM game_players WHERE game_id = $1")
                .bind(game_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn stats(&self, game_player_id: i64) -> Result<PlayerStats, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT \
               (SELECT COUNT(*) FROM hire_orders o WHERE o.game_player_id = gp.id) AS total_orders, \
               (SELECT COUNT(*) FROM player_reviews r WHERE r.game_player_id = gp.id) AS total_reviews, \
               (SELECT COALESCE(SUM(p.coin), 0) FROM payments p \
                  WHERE p.game_player_id = gp.id \
                    AND p.payment_type IN ('HIRE', 'DONATE') \
                    AND p.status = 'COMPLETED') AS total_revenue, \
               (SELECT AVG(r.rating)::float8 FROM player_reviews r \
                  WHERE r.game_player_id = gp.id) AS rating \
             FROM game_players gp WHERE gp.id = $1",
        )
        .bind(game_player_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Listing with id {} not found", game_player_id))
        })?;

        Ok(PlayerStats {
            game_player_id,
            total_orders: row.total_orders,
            total_reviews: row.total_reviews,
            total_revenue: row.total_revenue,
            rating: row.rating.unwrap_or(0.0),
        })
    }

    async fn summaries(&self) -> Result<Vec<PlayerSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT gp.id, gp.nickname, u.email, gp.available, gp.rank, g.name AS game_name, \
               u.avatar_url, \
               (SELECT COUNT(*) FROM hire_orders o WHERE o.game_player_id = gp.id) AS total_orders, \
               (SELECT COUNT(*) FROM player_reviews r WHERE r.game_player_id = gp.id) AS total_reviews, \
               (SELECT COALESCE(SUM(p.coin), 0) FROM payments p \
                  WHERE p.game_player_id = gp.id \
                    AND p.payment_type IN ('HIRE', 'DONATE') \
                    AND p.status = 'COMPLETED') AS total_revenue, \
               (SELECT AVG(r.rating)::float8 FROM player_reviews r \
                  WHERE r.game_player_id = gp.id) AS rating \
             FROM game_players gp \
             JOIN users u ON u.id = gp.user_id \
             JOIN games g ON g.id = gp.game_id \
             ORDER BY gp.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PlayerSummary {
                id: r.id,
                nickname: r.nickname,
                email: r.email,
                total_orders: r.total_orders,
                total_reviews: r.total_reviews,
                total_revenue: r.total_revenue,
                available: r.available,
                rank: r.rank,
                rating: r.rating.unwrap_or(0.0),
                game_name: r.game_name,
                avatar_url: r.avatar_url,
            })
            .collect())
    }
}
