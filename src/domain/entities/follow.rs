//! Player follow entity and repository trait.
//!
//! Maps to the `player_follows` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A user following a player listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerFollow {
    pub id: i64,
    pub follower_id: i64,
    pub game_player_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for follows.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn follow(&self, follower_id: i64, game_player_id: i64) -> Result<PlayerFollow, AppError>;

    /// Returns true when a follow row was removed.
    async fn unfollow(&self, follower_id: i64, game_player_id: i64) -> Result<bool, AppError>;

    /// Follower user ids of a listing, for notification fan-out.
    async fn follower_ids(&self, game_player_id: i64) -> Result<Vec<i64>, AppError>;

    /// Listings a user follows.
    async fn followed_player_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError>;

    async fn count_followers(&self, game_player_id: i64) -> Result<i64, AppError>;
}
