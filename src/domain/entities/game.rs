//! Game entity and repository trait.
//!
//! Maps to the `games` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Whether a game is open for new player listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Active,
    Inactive,
}

impl GameStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "inactive" => Self::Inactive,
            _ => Self::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A game in the catalog that players can register listings for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    /// Unique game name
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: GameStatus,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    /// Free-text system requirements
    pub requirements: Option<String>,
    /// Whether listings for this game declare an in-game role
    pub has_roles: bool,
    /// Selectable in-game roles (e.g. "Jungle", "Support")
    pub available_roles: Vec<String>,
    /// Selectable rank labels (e.g. "Gold", "Diamond")
    pub available_ranks: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Game {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            description: None,
            category: None,
            platform: None,
            status: GameStatus::Active,
            image_url: None,
            website_url: None,
            requirements: None,
            has_roles: false,
            available_roles: Vec::new(),
            available_ranks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for game catalog access.
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Game>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Game>, AppError>;

    async fn find_all(&self) -> Result<Vec<Game>, AppError>;

    async fn create(&self, game: &Game) -> Result<Game, AppError>;

    async fn update(&self, game: &Game) -> Result<Game, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn exists(&self, id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(GameStatus::from_str("active"), GameStatus::Active);
        assert_eq!(GameStatus::from_str("INACTIVE"), GameStatus::Inactive);
        // Unknown values default to active
        assert_eq!(GameStatus::from_str("archived"), GameStatus::Active);
    }
}
