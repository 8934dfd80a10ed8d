//! Moment Service
//!
//! Social feed: players publish moments, followers get notified and read
//! them in a feed.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::domain::{
    FollowRepository, GamePlayer, GamePlayerRepository, Moment, MomentRepository, MomentStatus,
    MAX_MOMENT_CONTENT, MAX_MOMENT_IMAGES,
};
use crate::shared::pagination::{Page, PageRequest};

use super::NotificationService;

/// Characters of moment content quoted in follower notifications.
const PREVIEW_LENGTH: usize = 50;

/// New moment request
#[derive(Debug, Clone)]
pub struct NewMoment {
    pub content: String,
    pub image_urls: Vec<String>,
}

/// Moment service trait
#[async_trait]
pub trait MomentService: Send + Sync {
    /// Publish a moment on one of the caller's listings and notify followers.
    async fn create(
        &self,
        user_id: i64,
        game_player_id: i64,
        moment: NewMoment,
    ) -> Result<Moment, MomentError>;

    async fn get(&self, moment_id: i64) -> Result<Moment, MomentError>;

    async fn by_player(
        &self,
        game_player_id: i64,
        page: PageRequest,
    ) -> Result<Page<Moment>, MomentError>;

    /// The caller's own moments across all their listings.
    async fn mine(&self, user_id: i64, page: PageRequest) -> Result<Page<Moment>, MomentError>;

    /// Moments of every listing the caller follows.
    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<Moment>, MomentError>;

    async fn all(&self, page: PageRequest) -> Result<Page<Moment>, MomentError>;

    async fn update(
        &self,
        user_id: i64,
        moment_id: i64,
        moment: NewMoment,
    ) -> Result<Moment, MomentError>;

    /// Soft delete (owner only).
    async fn delete(&self, user_id: i64, moment_id: i64) -> Result<(), MomentError>;

    /// Flip Active <-> Hidden (owner only).
    async fn toggle_visibility(&self, user_id: i64, moment_id: i64) -> Result<(), MomentError>;

    async fn follow(&self, user_id: i64, game_player_id: i64) -> Result<(), MomentError>;

    async fn unfollow(&self, user_id: i64, game_player_id: i64) -> Result<(), MomentError>;

    async fn follower_count(&self, game_player_id: i64) -> Result<i64, MomentError>;
}

/// Moment service errors
#[derive(Debug, thiserror::Error)]
pub enum MomentError {
    #[error("Moment not found or access denied")]
    NotFound,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Not the owner of this listing")]
    NotOwner,

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Content cannot exceed {MAX_MOMENT_CONTENT} characters")]
    ContentTooLong,

    #[error("Maximum {MAX_MOMENT_IMAGES} images allowed per moment")]
    TooManyImages,

    #[error("Image URL cannot be empty")]
    EmptyImageUrl,

    #[error("Already following this player")]
    AlreadyFollowing,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validate and normalize a moment body before it hits storage.
fn validate(moment: &NewMoment) -> Result<String, MomentError> {
    let content = moment.content.trim();
    if content.is_empty() {
        return Err(MomentError::EmptyContent);
    }
    if content.chars().count() > MAX_MOMENT_CONTENT {
        return Err(MomentError::ContentTooLong);
    }
    if moment.image_urls.len() > MAX_MOMENT_IMAGES {
        return Err(MomentError::TooManyImages);
    }
    if moment.image_urls.iter().any(|url| url.trim().is_empty()) {
        return Err(MomentError::EmptyImageUrl);
    }
    Ok(content.to_string())
}

/// MomentService implementation
pub struct MomentServiceImpl<M, GP, F, N>
where
    M: MomentRepository,
    GP: GamePlayerRepository,
    F: FollowRepository,
    N: NotificationService,
{
    moment_repo: Arc<M>,
    player_repo: Arc<GP>,
    follow_repo: Arc<F>,
    notifications: Arc<N>,
}

impl<M, GP, F, N> MomentServiceImpl<M, GP, F, N>
where
    M: MomentRepository,
    GP: GamePlayerRepository,
    F: FollowRepository,
    N: NotificationService,
{
    pub fn new(
        moment_repo: Arc<M>,
        player_repo: Arc<GP>,
        follow_repo: Arc<F>,
        notifications: Arc<N>,
    ) -> Self {
        Self {
            moment_repo,
            player_repo,
            follow_repo,
            notifications,
        }
    }

    async fn require_owned_listing(
        &self,
        user_id: i64,
        game_player_id: i64,
    ) -> Result<GamePlayer, MomentError> {
        let listing = self
            .player_repo
            .find_by_id(game_player_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .ok_or(MomentError::ListingNotFound)?;

        if listing.user_id != user_id {
            return Err(MomentError::NotOwner);
        }

        Ok(listing)
    }

    async fn notify_followers(&self, listing: &GamePlayer, moment: &Moment) {
        let followers = match self.follow_repo.follower_ids(listing.id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    game_player_id = listing.id,
                    "Failed to load followers for fan-out: {}",
                    e
                );
                return;
            }
        };

        let title = format!("{} posted a new moment!", listing.nickname);
        let preview: String = moment.content.chars().take(PREVIEW_LENGTH).collect();
        let message = if moment.content.chars().count() > PREVIEW_LENGTH {
            format!("{}...", preview)
        } else {
            preview
        };
        let action_url = format!("/player/{}/moments", listing.id);

        let sends = followers.into_iter().map(|follower_id| {
            let title = title.clone();
            let message = message.clone();
            let action_url = action_url.clone();
            let ref_id = moment.id.to_string();
            async move {
                if let Err(e) = self
                    .notifications
                    .notify(
                        follower_id,
                        &title,
                        &message,
                        "moment",
                        Some(action_url),
                        Some(ref_id),
                    )
                    .await
                {
                    tracing::warn!(follower_id, "Failed to notify follower: {}", e);
                }
            }
        });

        join_all(sends).await;
    }
}

#[async_trait]
impl<M, GP, F, N> MomentService for MomentServiceImpl<M, GP, F, N>
where
    M: MomentRepository + 'static,
    GP: GamePlayerRepository + 'static,
    F: FollowRepository + 'static,
    N: NotificationService + 'static,
{
    async fn create(
        &self,
        user_id: i64,
        game_player_id: i64,
        moment: NewMoment,
    ) -> Result<Moment, MomentError> {
        let listing = self.require_owned_listing(user_id, game_player_id).await?;
        let content = validate(&moment)?;

        let created = self
            .moment_repo
            .create(&Moment {
                id: 0,
                game_player_id,
                content,
                status: MomentStatus::Active,
                image_urls: moment
                    .image_urls
                    .iter()
                    .map(|url| url.trim().to_string())
                    .collect(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            })
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?;

        self.notify_followers(&listing, &created).await;

        Ok(created)
    }

    async fn get(&self, moment_id: i64) -> Result<Moment, MomentError> {
        self.moment_repo
            .find_by_id(moment_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .ok_or(MomentError::NotFound)
    }

    async fn by_player(
        &self,
        game_player_id: i64,
        page: PageRequest,
    ) -> Result<Page<Moment>, MomentError> {
        self.moment_repo
            .page_by_player(game_player_id, page)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn mine(&self, user_id: i64, page: PageRequest) -> Result<Page<Moment>, MomentError> {
        self.moment_repo
            .page_by_user(user_id, page)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<Moment>, MomentError> {
        let followed = self
            .follow_repo
            .followed_player_ids(user_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?;

        if followed.is_empty() {
            return Ok(Page::empty(page));
        }

        self.moment_repo
            .page_by_players(&followed, page)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn all(&self, page: PageRequest) -> Result<Page<Moment>, MomentError> {
        self.moment_repo
            .page_all(page)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn update(
        &self,
        user_id: i64,
        moment_id: i64,
        moment: NewMoment,
    ) -> Result<Moment, MomentError> {
        let mut existing = self
            .moment_repo
            .find_owned(moment_id, user_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .ok_or(MomentError::NotFound)?;

        let content = validate(&moment)?;
        existing.content = content;
        existing.image_urls = moment
            .image_urls
            .iter()
            .map(|url| url.trim().to_string())
            .collect();

        self.moment_repo
            .update(&existing)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn delete(&self, user_id: i64, moment_id: i64) -> Result<(), MomentError> {
        let existing = self
            .moment_repo
            .find_owned(moment_id, user_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .ok_or(MomentError::NotFound)?;

        self.moment_repo
            .set_status(existing.id, MomentStatus::Deleted)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn toggle_visibility(&self, user_id: i64, moment_id: i64) -> Result<(), MomentError> {
        let existing = self
            .moment_repo
            .find_owned(moment_id, user_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .ok_or(MomentError::NotFound)?;

        self.moment_repo
            .set_status(existing.id, existing.status.toggled())
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn follow(&self, user_id: i64, game_player_id: i64) -> Result<(), MomentError> {
        if self
            .player_repo
            .find_by_id(game_player_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))?
            .is_none()
        {
            return Err(MomentError::ListingNotFound);
        }

        self.follow_repo
            .follow(user_id, game_player_id)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                crate::shared::error::AppError::Conflict(_) => MomentError::AlreadyFollowing,
                e => MomentError::Internal(e.to_string()),
            })
    }

    async fn unfollow(&self, user_id: i64, game_player_id: i64) -> Result<(), MomentError> {
        self.follow_repo
            .unfollow(user_id, game_player_id)
            .await
            .map(|_| ())
            .map_err(|e| MomentError::Internal(e.to_string()))
    }

    async fn follower_count(&self, game_player_id: i64) -> Result<i64, MomentError> {
        self.follow_repo
            .count_followers(game_player_id)
            .await
            .map_err(|e| MomentError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_accepts() {
        let moment = NewMoment {
            content: "  hello world  ".to_string(),
            image_urls: vec![],
        };
        assert_eq!(validate(&moment).unwrap(), "hello world");
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        let moment = NewMoment {
            content: "   ".to_string(),
            image_urls: vec![],
        };
        assert!(matches!(validate(&moment), Err(MomentError::EmptyContent)));
    }

    #[test]
    fn test_validate_rejects_too_long_content() {
        let moment = NewMoment {
            content: "x".repeat(MAX_MOMENT_CONTENT + 1),
            image_urls: vec![],
        };
        assert!(matches!(validate(&moment), Err(MomentError::ContentTooLong)));
    }

    #[test]
    fn test_validate_rejects_too_many_images() {
        let moment = NewMoment {
            content: "ok".to_string(),
            image_urls: vec!["http://img".to_string(); MAX_MOMENT_IMAGES + 1],
        };
        assert!(matches!(validate(&moment), Err(MomentError::TooManyImages)));
    }

    #[test]
    fn test_validate_rejects_blank_image_url() {
        let moment = NewMoment {
            content: "ok".to_string(),
            image_urls: vec!["http://img".to_string(), "  ".to_string()],
        };
        assert!(matches!(validate(&moment), Err(MomentError::EmptyImageUrl)));
    }
}
