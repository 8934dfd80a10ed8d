//! Game Catalog Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateGameRequest, UpdateGameRequest};
use crate::application::dto::response::{GameResponse, MessageResponse};
use crate::application::services::{GameError, GameService, GameServiceImpl};
use crate::domain::{Game, GamePlayerRepository, GameStatus, Role};
use crate::infrastructure::repositories::{PgGamePlayerRepository, PgGameRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<GameError> for AppError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::NotFound => AppError::NotFound("Game not found".into()),
            GameError::NameTaken => AppError::Conflict("Game name already exists".into()),
            GameError::PlayersRegistered(count) => AppError::Conflict(format!(
                "Cannot delete game: {} players are still registered",
                count
            )),
            GameError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn game_service(state: &AppState) -> GameServiceImpl<PgGameRepository, PgGamePlayerRepository> {
    GameServiceImpl::new(
        Arc::new(PgGameRepository::new(state.db.clone())),
        Arc::new(PgGamePlayerRepository::new(state.db.clone())),
    )
}

/// List all games with their registered player counts (public)
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = game_service(&state).list_games().await?;

    Ok(Json(
        games
            .into_iter()
            .map(|g| GameResponse::from_game(g.game, g.player_count))
            .collect(),
    ))
}

/// Create a game (admin)
pub async fn create_game(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    auth.require(Role::Admin)?;
    body.validate().map_err(validation_error)?;

    let game = Game {
        name: body.name,
        description: body.description,
        category: body.category,
        platform: body.platform,
        status: body
            .status
            .as_deref()
            .map(GameStatus::from_str)
            .unwrap_or_default(),
        image_url: body.image_url,
        website_url: body.website_url,
        requirements: body.requirements,
        has_roles: body.has_roles,
        available_roles: body.available_roles,
        available_ranks: body.available_ranks,
        ..Game::default()
    };

    let created = game_service(&state).create_game(game).await?;
    Ok((StatusCode::CREATED, Json(GameResponse::from_game(created, 0))))
}

/// Update a game (admin)
pub async fn update_game(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(game_id): Path<i64>,
    Json(body): Json<UpdateGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    auth.require(Role::Admin)?;
    body.validate().map_err(validation_error)?;

    let existing = game_service(&state).get_game(game_id).await?;

    let game = Game {
        id: game_id,
        name: body.name,
        description: body.description,
        category: body.category,
        platform: body.platform,
        status: body
            .status
            .as_deref()
            .map(GameStatus::from_str)
            .unwrap_or(existing.status),
        image_url: body.image_url,
        website_url: body.website_url,
        requirements: body.requirements,
        has_roles: body.has_roles,
        available_roles: body.available_roles,
        available_ranks: body.available_ranks,
        ..existing
    };

    let updated = game_service(&state).update_game(game).await?;

    let player_repo = PgGamePlayerRepository::new(state.db.clone());
    let player_count = player_repo.count_by_game(game_id).await?;

    Ok(Json(GameResponse::from_game(updated, player_count)))
}

/// Delete a game (admin)
pub async fn delete_game(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(game_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;

    game_service(&state).delete_game(game_id).await?;
    Ok(Json(MessageResponse::new("Game deleted successfully")))
}
