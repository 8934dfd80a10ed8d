//! Player listing entity and repository trait.
//!
//! A `GamePlayer` is a player-companion listing: a user offering paid
//! sessions for a specific game. Maps to the `game_players` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A player-companion listing for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlayer {
    pub id: i64,
    /// Owning user account
    pub user_id: i64,
    pub game_id: i64,
    /// Public listing name shown in browse results
    pub nickname: String,
    pub description: Option<String>,
    /// Rank label from the game's available_ranks
    pub rank: Option<String>,
    /// In-game roles offered
    pub roles: Vec<String>,
    /// Price in coins per hired hour
    pub hourly_rate: i64,
    /// Whether the listing accepts hires
    pub available: bool,
    /// Completed hire count, bumped on every hire
    pub hire_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for GamePlayer {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id: 0,
            game_id: 0,
            nickname: String::new(),
            description: None,
            rank: None,
            roles: Vec::new(),
            hourly_rate: 0,
            available: true,
            hire_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregated statistics for a listing.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    pub game_player_id: i64,
    pub total_orders: i64,
    pub total_reviews: i64,
    /// Sum of coins earned through hires and donations
    pub total_revenue: i64,
    /// Average review rating, 0.0 when unreviewed
    pub rating: f64,
}

/// Dashboard projection of a listing joined with its owner and game.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    pub total_orders: i64,
    pub total_reviews: i64,
    pub total_revenue: i64,
    pub available: bool,
    pub rank: Option<String>,
    pub rating: f64,
    pub game_name: String,
    pub avatar_url: Option<String>,
}

/// Repository trait for player listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GamePlayerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<GamePlayer>, AppError>;

    async fn find_by_game(&self, game_id: i64) -> Result<Vec<GamePlayer>, AppError>;

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<GamePlayer>, AppError>;

    /// A user may hold at most one listing per game.
    async fn find_by_user_and_game(
        &self,
        user_id: i64,
        game_id: i64,
    ) -> Result<Option<GamePlayer>, AppError>;

    async fn create(&self, player: &GamePlayer) -> Result<GamePlayer, AppError>;

    async fn update(&self, player: &GamePlayer) -> Result<GamePlayer, AppError>;

    async fn count_by_game(&self, game_id: i64) -> Result<i64, AppError>;

    async fn stats(&self, game_player_id: i64) -> Result<PlayerStats, AppError>;

    async fn summaries(&self) -> Result<Vec<PlayerSummary>, AppError>;
}
