//! Player Listing Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateListingRequest, UpdateListingRequest};
use crate::application::dto::response::ListingResponse;
use crate::application::services::{
    NewListing, PlayerError, PlayerService, PlayerServiceImpl, UpdateListing,
};
use crate::domain::{PlayerStats, PlayerSummary, Role};
use crate::infrastructure::repositories::{
    PgGamePlayerRepository, PgGameRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<PlayerError> for AppError {
    fn from(e: PlayerError) -> Self {
        match e {
            PlayerError::NotFound => AppError::NotFound("Listing not found".into()),
            PlayerError::GameNotFound => AppError::NotFound("Game not found".into()),
            PlayerError::AlreadyListed => {
                AppError::Conflict("A listing for this game already exists".into())
            }
            PlayerError::InvalidRate => AppError::BadRequest("Hourly rate must be positive".into()),
            PlayerError::NotOwner => AppError::Forbidden("Not the owner of this listing".into()),
            PlayerError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn player_service(
    state: &AppState,
) -> PlayerServiceImpl<PgGamePlayerRepository, PgGameRepository, PgUserRepository> {
    PlayerServiceImpl::new(
        Arc::new(PgGamePlayerRepository::new(state.db.clone())),
        Arc::new(PgGameRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

/// Register as a player-companion for a game
pub async fn register_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let listing = player_service(&state)
        .register_listing(
            auth.user_id,
            NewListing {
                game_id: body.game_id,
                nickname: body.nickname,
                description: body.description,
                rank: body.rank,
                roles: body.roles,
                hourly_rate: body.hourly_rate,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

/// Update own listing
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<i64>,
    Json(body): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let listing = player_service(&state)
        .update_listing(
            auth.user_id,
            listing_id,
            UpdateListing {
                nickname: body.nickname,
                description: body.description,
                rank: body.rank,
                roles: body.roles,
                hourly_rate: body.hourly_rate,
                available: body.available,
            },
        )
        .await?;

    Ok(Json(ListingResponse::from(listing)))
}

/// Get a listing (public)
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = player_service(&state).get_listing(listing_id).await?;
    Ok(Json(ListingResponse::from(listing)))
}

/// Browse listings of a game (public)
pub async fn browse_by_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let listings = player_service(&state).browse_by_game(game_id).await?;
    Ok(Json(listings.into_iter().map(ListingResponse::from).collect()))
}

/// The caller's listings
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let listings = player_service(&state).my_listings(auth.user_id).await?;
    Ok(Json(listings.into_iter().map(ListingResponse::from).collect()))
}

/// Listing statistics (public)
pub async fn listing_stats(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Json<PlayerStats>, AppError> {
    let stats = player_service(&state).stats(listing_id).await?;
    Ok(Json(stats))
}

/// Listing summaries (admin dashboard)
pub async fn listing_summaries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    auth.require(Role::Admin)?;

    let summaries = player_service(&state).summaries().await?;
    Ok(Json(summaries))
}
