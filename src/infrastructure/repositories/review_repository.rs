//! Player Review Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{PlayerReview, ReviewRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    game_player_id: i64,
    reviewer_id: i64,
    order_id: i64,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> PlayerReview {
        PlayerReview {
            id: self.id,
            game_player_id: self.game_player_id,
            reviewer_id: self.reviewer_id,
            order_id: self.order_id,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL review repository implementation.
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(&self, review: &PlayerReview) -> Result<PlayerReview, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO player_reviews (game_player_id, reviewer_id, order_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, game_player_id, reviewer_id, order_id, rating, comment, created_at",
        )
        .bind(review.game_player_id)
        .bind(review.reviewer_id)
        .bind(review.order_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("This hire has already been reviewed".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_review())
    }

    async fn exists_by_order(&self, order_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM player_reviews WHERE order_id = $1)",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn find_by_player(&self, game_player_id: i64) -> Result<Vec<PlayerReview>, AppError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, game_player_id, reviewer_id, order_id, rating, comment, created_at \
             FROM player_reviews WHERE game_player_id = $1 ORDER BY created_at DESC",
        )
        .bind(game_player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_review()).collect())
    }

    async fn average_rating(&self, game_player_id: i64) -> Result<Option<f64>, AppError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating)::float8 FROM player_reviews WHERE game_player_id = $1",
        )
        .bind(game_player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }
}
