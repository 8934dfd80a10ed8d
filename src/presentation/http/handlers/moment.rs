//! Moment (Social Feed) Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::application::dto::request::CreateMomentRequest;
use crate::application::dto::response::{MessageResponse, MomentResponse};
use crate::application::services::{
    MomentError, MomentService, MomentServiceImpl, NewMoment, NotificationServiceImpl,
};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgGamePlayerRepository, PgMomentRepository, PgNotificationRepository,
    PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<MomentError> for AppError {
    fn from(e: MomentError) -> Self {
        match e {
            MomentError::NotFound => {
                AppError::NotFound("Moment not found or access denied".into())
            }
            MomentError::ListingNotFound => AppError::NotFound("Listing not found".into()),
            MomentError::NotOwner => AppError::Forbidden("Not the owner of this listing".into()),
            MomentError::EmptyContent
            | MomentError::ContentTooLong
            | MomentError::TooManyImages
            | MomentError::EmptyImageUrl => AppError::BadRequest(e.to_string()),
            MomentError::AlreadyFollowing => {
                AppError::Conflict("Already following this player".into())
            }
            MomentError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type AppMomentService = MomentServiceImpl<
    PgMomentRepository,
    PgGamePlayerRepository,
    PgFollowRepository,
    NotificationServiceImpl<PgNotificationRepository, PgUserRepository>,
>;

fn moment_service(state: &AppState) -> AppMomentService {
    let notifications = NotificationServiceImpl::new(
        Arc::new(PgNotificationRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.push.clone(),
    );

    MomentServiceImpl::new(
        Arc::new(PgMomentRepository::new(state.db.clone())),
        Arc::new(PgGamePlayerRepository::new(state.db.clone())),
        Arc::new(PgFollowRepository::new(state.db.clone())),
        Arc::new(notifications),
    )
}

fn to_page_response(page: Page<crate::domain::Moment>) -> Page<MomentResponse> {
    page.map(MomentResponse::from)
}

/// Publish a moment on one of the caller's listings
pub async fn create_moment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(game_player_id): Path<i64>,
    Json(body): Json<CreateMomentRequest>,
) -> Result<(StatusCode, Json<MomentResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let moment = moment_service(&state)
        .create(
            auth.user_id,
            game_player_id,
            NewMoment {
                content: body.content,
                image_urls: body.image_urls,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MomentResponse::from(moment))))
}

/// Get a moment by id (public)
pub async fn get_moment(
    State(state): State<AppState>,
    Path(moment_id): Path<i64>,
) -> Result<Json<MomentResponse>, AppError> {
    let moment = moment_service(&state).get(moment_id).await?;
    Ok(Json(MomentResponse::from(moment)))
}

/// Active moments of a listing (public)
pub async fn moments_by_player(
    State(state): State<AppState>,
    Path(game_player_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MomentResponse>>, AppError> {
    let moments = moment_service(&state).by_player(game_player_id, page).await?;
    Ok(Json(to_page_response(moments)))
}

/// The caller's own moments
pub async fn my_moments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MomentResponse>>, AppError> {
    let moments = moment_service(&state).mine(auth.user_id, page).await?;
    Ok(Json(to_page_response(moments)))
}

/// Feed of followed players
pub async fn moment_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MomentResponse>>, AppError> {
    let moments = moment_service(&state).feed(auth.user_id, page).await?;
    Ok(Json(to_page_response(moments)))
}

/// All active moments (public)
pub async fn all_moments(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MomentResponse>>, AppError> {
    let moments = moment_service(&state).all(page).await?;
    Ok(Json(to_page_response(moments)))
}

/// Update own moment
pub async fn update_moment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(moment_id): Path<i64>,
    Json(body): Json<CreateMomentRequest>,
) -> Result<Json<MomentResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let moment = moment_service(&state)
        .update(
            auth.user_id,
            moment_id,
            NewMoment {
                content: body.content,
                image_urls: body.image_urls,
            },
        )
        .await?;

    Ok(Json(MomentResponse::from(moment)))
}

/// Soft-delete own moment
pub async fn delete_moment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(moment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    moment_service(&state).delete(auth.user_id, moment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle moment visibility (Active <-> Hidden)
pub async fn toggle_moment_visibility(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(moment_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    moment_service(&state)
        .toggle_visibility(auth.user_id, moment_id)
        .await?;
    Ok(Json(MessageResponse::new("Visibility updated")))
}

/// Follow a player listing
pub async fn follow_player(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(game_player_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    moment_service(&state)
        .follow(auth.user_id, game_player_id)
        .await?;
    Ok(Json(MessageResponse::new("Now following")))
}

/// Unfollow a player listing
pub async fn unfollow_player(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(game_player_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    moment_service(&state)
        .unfollow(auth.user_id, game_player_id)
        .await?;
    Ok(Json(MessageResponse::new("Unfollowed")))
}

/// Follower count response
#[derive(Debug, Serialize)]
pub struct FollowerCountResponse {
    pub game_player_id: String,
    pub follower_count: i64,
}

/// Follower count of a listing (public)
pub async fn follower_count(
    State(state): State<AppState>,
    Path(game_player_id): Path<i64>,
) -> Result<Json<FollowerCountResponse>, AppError> {
    let count = moment_service(&state).follower_count(game_player_id).await?;
    Ok(Json(FollowerCountResponse {
        game_player_id: game_player_id.to_string(),
        follower_count: count,
    }))
}
