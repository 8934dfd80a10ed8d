//! Player Follow Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{FollowRepository, PlayerFollow};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct FollowRow {
    id: i64,
    follower_id: i64,
    game_player_id: i64,
    created_at: DateTime<Utc>,
}

/// PostgreSQL follow repository implementation.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn follow(
        &self,
        follower_id: i64,
        game_player_id: i64,
    ) -> Result<PlayerFollow, AppError> {
        let row = sqlx::query_as::<_, FollowRow>(
            "INSERT INTO player_follows (follower_id, game_player_id) VALUES ($1, $2) \
             RETURNING id, follower_id, game_player_id, created_at",
        )
        .bind(follower_id)
        .bind(game_player_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Already following this player".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(PlayerFollow {
            id: row.id,
            follower_id: row.follower_id,
            game_player_id: row.game_player_id,
            created_at: row.created_at,
        })
    }

    async fn unfollow(&self, follower_id: i64, game_player_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM player_follows WHERE follower_id = $1 AND game_player_id = $2",
        )
        .bind(follower_id)
        .bind(game_player_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn follower_ids(&self, game_player_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT follower_id FROM player_follows WHERE game_player_id = $1",
        )
        .bind(game_player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn followed_player_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT game_player_id FROM player_follows WHERE follower_id = $1",
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_followers(&self, game_player_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM player_follows WHERE game_player_id = $1",
        )
        .bind(game_player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
