//! Moment (social feed post) entity and repository trait.
//!
//! Maps to the `moments` and `moment_images` tables. Images are stored as
//! ordered URLs and surfaced on the entity directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// Maximum characters in a moment body.
pub const MAX_MOMENT_CONTENT: usize = 1000;

/// Maximum images attached to one moment.
pub const MAX_MOMENT_IMAGES: usize = 10;

/// Visibility state of a moment. Deleted moments stay in storage (soft delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MomentStatus {
    #[default]
    Active,
    Hidden,
    Deleted,
}

impl MomentStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HIDDEN" => Self::Hidden,
            "DELETED" => Self::Deleted,
            _ => Self::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Hidden => "HIDDEN",
            Self::Deleted => "DELETED",
        }
    }

    /// Toggle between Active and Hidden; Deleted is final.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Hidden,
            Self::Hidden => Self::Active,
            Self::Deleted => Self::Deleted,
        }
    }
}

/// A social post published by a player listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub id: i64,
    pub game_player_id: i64,
    pub content: String,
    pub status: MomentStatus,
    /// Ordered image URLs (display order preserved)
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for moments.
#[async_trait]
pub trait MomentRepository: Send + Sync {
    /// Insert a moment together with its ordered images.
    async fn create(&self, moment: &Moment) -> Result<Moment, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Moment>, AppError>;

    /// A moment only if it belongs to a listing owned by `user_id`.
    async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Moment>, AppError>;

    /// Active moments of one listing, newest first.
    async fn page_by_player(
        &self,
        game_player_id: i64,
        page: PageRequest,
    ) -> Result<Page<Moment>, AppError>;

    /// Active moments of every listing owned by a user, newest first.
    async fn page_by_user(&self, user_id: i64, page: PageRequest)
        -> Result<Page<Moment>, AppError>;

    /// Active moments of the given listings, newest first (the feed).
    async fn page_by_players(
        &self,
        game_player_ids: &[i64],
        page: PageRequest,
    ) -> Result<Page<Moment>, AppError>;

    /// All active moments, newest first.
    async fn page_all(&self, page: PageRequest) -> Result<Page<Moment>, AppError>;

    /// Replace content and images of a moment.
    async fn update(&self, moment: &Moment) -> Result<Moment, AppError>;

    async fn set_status(&self, id: i64, status: MomentStatus) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_visibility() {
        assert_eq!(MomentStatus::Active.toggled(), MomentStatus::Hidden);
        assert_eq!(MomentStatus::Hidden.toggled(), MomentStatus::Active);
        assert_eq!(MomentStatus::Deleted.toggled(), MomentStatus::Deleted);
    }

    #[test]
    fn test_status_from_str_defaults_to_active() {
        assert_eq!(MomentStatus::from_str("active"), MomentStatus::Active);
        assert_eq!(MomentStatus::from_str("hidden"), MomentStatus::Hidden);
        assert_eq!(MomentStatus::from_str("junk"), MomentStatus::Active);
    }
}
