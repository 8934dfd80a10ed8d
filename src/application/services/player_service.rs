//! Player Listing Service

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    GamePlayer, GamePlayerRepository, GameRepository, PlayerStats, PlayerSummary, Role,
    UserRepository,
};

/// New listing request
#[derive(Debug, Clone)]
pub struct NewListing {
    pub game_id: i64,
    pub nickname: String,
    pub description: Option<String>,
    pub rank: Option<String>,
    pub roles: Vec<String>,
    pub hourly_rate: i64,
}

/// Listing update request
#[derive(Debug, Clone, Default)]
pub struct UpdateListing {
    pub nickname: Option<String>,
    pub description: Option<String>,
    pub rank: Option<String>,
    pub roles: Option<Vec<String>>,
    pub hourly_rate: Option<i64>,
    pub available: Option<bool>,
}

/// Player listing service trait
#[async_trait]
pub trait PlayerService: Send + Sync {
    /// Register the user as a player-companion for a game. Grants the
    /// Player role on first listing.
    async fn register_listing(
        &self,
        user_id: i64,
        listing: NewListing,
    ) -> Result<GamePlayer, PlayerError>;

    async fn update_listing(
        &self,
        user_id: i64,
        listing_id: i64,
        update: UpdateListing,
    ) -> Result<GamePlayer, PlayerError>;

    async fn get_listing(&self, listing_id: i64) -> Result<GamePlayer, PlayerError>;

    async fn browse_by_game(&self, game_id: i64) -> Result<Vec<GamePlayer>, PlayerError>;

    async fn my_listings(&self, user_id: i64) -> Result<Vec<GamePlayer>, PlayerError>;

    async fn stats(&self, listing_id: i64) -> Result<PlayerStats, PlayerError>;

    async fn summaries(&self) -> Result<Vec<PlayerSummary>, PlayerError>;
}

/// Player listing service errors
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Listing not found")]
    NotFound,

    #[error("Game not found")]
    GameNotFound,

    #[error("A listing for this game already exists")]
    AlreadyListed,

    #[error("Hourly rate must be positive")]
    InvalidRate,

    #[error("Not the owner of this listing")]
    NotOwner,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PlayerService implementation
pub struct PlayerServiceImpl<GP, G, U>
where
    GP: GamePlayerRepository,
    G: GameRepository,
    U: UserRepository,
{
    player_repo: Arc<GP>,
    game_repo: Arc<G>,
    user_repo: Arc<U>,
}

impl<GP, G, U> PlayerServiceImpl<GP, G, U>
where
    GP: GamePlayerRepository,
    G: GameRepository,
    U: UserRepository,
{
    pub fn new(player_repo: Arc<GP>, game_repo: Arc<G>, user_repo: Arc<U>) -> Self {
        Self {
            player_repo,
            game_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl<GP, G, U> PlayerService for PlayerServiceImpl<GP, G, U>
where
    GP: GamePlayerRepository + 'static,
    G: GameRepository + 'static,
    U: UserRepository + 'static,
{
    async fn register_listing(
        &self,
        user_id: i64,
        listing: NewListing,
    ) -> Result<GamePlayer, PlayerError> {
        if listing.hourly_rate <= 0 {
            return Err(PlayerError::InvalidRate);
        }

        if !self
            .game_repo
            .exists(listing.game_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))?
        {
            return Err(PlayerError::GameNotFound);
        }

        if self
            .player_repo
            .find_by_user_and_game(user_id, listing.game_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))?
            .is_some()
        {
            return Err(PlayerError::AlreadyListed);
        }

        let player = GamePlayer {
            user_id,
            game_id: listing.game_id,
            nickname: listing.nickname,
            description: listing.description,
            rank: listing.rank,
            roles: listing.roles,
            hourly_rate: listing.hourly_rate,
            ..GamePlayer::default()
        };

        let created = self.player_repo.create(&player).await.map_err(|e| match e {
            crate::shared::error::AppError::Conflict(_) => PlayerError::AlreadyListed,
            e => PlayerError::Internal(e.to_string()),
        })?;

        // First listing upgrades the account to a Player
        if let Ok(Some(user)) = self.user_repo.find_by_id(user_id).await {
            if !user.has_role(Role::Player) {
                let mut roles = user.roles.clone();
                roles.push(Role::Player);
                let _ = self.user_repo.set_roles(user_id, &roles).await;
            }
        }

        Ok(created)
    }

    async fn update_listing(
        &self,
        user_id: i64,
        listing_id: i64,
        update: UpdateListing,
    ) -> Result<GamePlayer, PlayerError> {
        let mut player = self
            .player_repo
            .find_by_id(listing_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))?
            .ok_or(PlayerError::NotFound)?;

        if player.user_id != user_id {
            return Err(PlayerError::NotOwner);
        }

        if let Some(rate) = update.hourly_rate {
            if rate <= 0 {
                return Err(PlayerError::InvalidRate);
            }
            player.hourly_rate = rate;
        }
        if let Some(nickname) = update.nickname {
            player.nickname = nickname;
        }
        if let Some(description) = update.description {
            player.description = Some(description);
        }
        if let Some(rank) = update.rank {
            player.rank = Some(rank);
        }
        if let Some(roles) = update.roles {
            player.roles = roles;
        }
        if let Some(available) = update.available {
            player.available = available;
        }

        self.player_repo
            .update(&player)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))
    }

    async fn get_listing(&self, listing_id: i64) -> Result<GamePlayer, PlayerError> {
        self.player_repo
            .find_by_id(listing_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))?
            .ok_or(PlayerError::NotFound)
    }

    async fn browse_by_game(&self, game_id: i64) -> Result<Vec<GamePlayer>, PlayerError> {
        if !self
            .game_repo
            .exists(game_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))?
        {
            return Err(PlayerError::GameNotFound);
        }

        self.player_repo
            .find_by_game(game_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))
    }

    async fn my_listings(&self, user_id: i64) -> Result<Vec<GamePlayer>, PlayerError> {
        self.player_repo
            .find_by_user(user_id)
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))
    }

    async fn stats(&self, listing_id: i64) -> Result<PlayerStats, PlayerError> {
        self.player_repo.stats(listing_id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => PlayerError::NotFound,
            e => PlayerError::Internal(e.to_string()),
        })
    }

    async fn summaries(&self) -> Result<Vec<PlayerSummary>, PlayerError> {
        self.player_repo
            .summaries()
            .await
            .map_err(|e| PlayerError::Internal(e.to_string()))
    }

}
