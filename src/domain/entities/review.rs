//! Player review entity and repository trait.
//!
//! Maps to the `player_reviews` table. One review per hire order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A review left by a hirer after a hire finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerReview {
    pub id: i64,
    pub game_player_id: i64,
    pub reviewer_id: i64,
    /// The hire order this review settles; unique
    pub order_id: i64,
    /// 1..=5
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for player reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &PlayerReview) -> Result<PlayerReview, AppError>;

    async fn exists_by_order(&self, order_id: i64) -> Result<bool, AppError>;

    async fn find_by_player(&self, game_player_id: i64) -> Result<Vec<PlayerReview>, AppError>;

    /// Average rating for a listing, `None` when unreviewed.
    async fn average_rating(&self, game_player_id: i64) -> Result<Option<f64>, AppError>;
}
