//! Game Catalog Service

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Game, GamePlayerRepository, GameRepository};

/// Game joined with its registered player count for browse listings.
#[derive(Debug, Clone)]
pub struct GameWithPlayerCount {
    pub game: Game,
    pub player_count: i64,
}

/// Game service trait
#[async_trait]
pub trait GameService: Send + Sync {
    async fn create_game(&self, game: Game) -> Result<Game, GameError>;

    async fn update_game(&self, game: Game) -> Result<Game, GameError>;

    /// Delete a game; rejected while listings still reference it.
    async fn delete_game(&self, game_id: i64) -> Result<(), GameError>;

    async fn get_game(&self, game_id: i64) -> Result<Game, GameError>;

    async fn list_games(&self) -> Result<Vec<GameWithPlayerCount>, GameError>;
}

/// Game service errors
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found")]
    NotFound,

    #[error("Game name already exists")]
    NameTaken,

    #[error("Game still has {0} registered players")]
    PlayersRegistered(i64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// GameService implementation
pub struct GameServiceImpl<G, GP>
where
    G: GameRepository,
    GP: GamePlayerRepository,
{
    game_repo: Arc<G>,
    player_repo: Arc<GP>,
}

impl<G, GP> GameServiceImpl<G, GP>
where
    G: GameRepository,
    GP: GamePlayerRepository,
{
    pub fn new(game_repo: Arc<G>, player_repo: Arc<GP>) -> Self {
        Self {
            game_repo,
            player_repo,
        }
    }
}

#[async_trait]
impl<G, GP> GameService for GameServiceImpl<G, GP>
where
    G: GameRepository + 'static,
    GP: GamePlayerRepository + 'static,
{
    async fn create_game(&self, game: Game) -> Result<Game, GameError> {
        if self
            .game_repo
            .find_by_name(&game.name)
            .await
            .map_err(|e| GameError::Internal(e.to_string()))?
            .is_some()
        {
            return Err(GameError::NameTaken);
        }

        self.game_repo.create(&game).await.map_err(|e| match e {
            crate::shared::error::AppError::Conflict(_) => GameError::NameTaken,
            e => GameError::Internal(e.to_string()),
        })
    }

    async fn update_game(&self, game: Game) -> Result<Game, GameError> {
        self.game_repo.update(&game).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => GameError::NotFound,
            crate::shared::error::AppError::Conflict(_) => GameError::NameTaken,
            e => GameError::Internal(e.to_string()),
        })
    }

    async fn delete_game(&self, game_id: i64) -> Result<(), GameError> {
        if !self
            .game_repo
            .exists(game_id)
            .await
            .map_err(|e| GameError::Internal(e.to_string()))?
        {
            return Err(GameError::NotFound);
        }

        let player_count = self
            .player_repo
            .count_by_game(game_id)
            .await
            .map_err(|e| GameError::Internal(e.to_string()))?;

        if player_count > 0 {
            return Err(GameError::PlayersRegistered(player_count));
        }

        self.game_repo.delete(game_id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => GameError::NotFound,
            e => GameError::Internal(e.to_string()),
        })
    }

    async fn get_game(&self, game_id: i64) -> Result<Game, GameError> {
        self.game_repo
            .find_by_id(game_id)
            .await
            .map_err(|e| GameError::Internal(e.to_string()))?
            .ok_or(GameError::NotFound)
    }

    async fn list_games(&self) -> Result<Vec<GameWithPlayerCount>, GameError> {
        let games = self
            .game_repo
            .find_all()
            .await
            .map_err(|e| GameError::Internal(e.to_string()))?;

        let mut result = Vec::with_capacity(games.len());
        for game in games {
            let player_count = self
                .player_repo
                .count_by_game(game.id)
                .await
                .map_err(|e| GameError::Internal(e.to_string()))?;
            result.push(GameWithPlayerCount { game, player_count });
        }

        Ok(result)
    }
}
