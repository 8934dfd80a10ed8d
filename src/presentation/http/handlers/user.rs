//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    AdminResetPasswordRequest, UpdateRolesRequest, UpdateUserRequest,
};
use crate::application::dto::response::{
    MessageResponse, OnlineStatusResponse, RecentUserResponse, UserResponse, UserSummaryResponse,
};
use crate::application::services::{
    UpdateProfileDto, UserError, UserService, UserServiceImpl,
};
use crate::domain::Role;
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound("User not found".into()),
            UserError::EmailTaken => AppError::Conflict("Email already taken".into()),
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(auth.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Update current user profile
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateProfileDto {
        full_name: body.full_name,
        email: body.email,
        phone_number: body.phone_number,
        address: body.address,
        bio: body.bio,
        gender: body.gender,
        avatar_url: body.avatar_url,
        cover_image_url: body.cover_image_url,
    };

    let user = user_service(&state)
        .update_profile(auth.user_id, update)
        .await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Get user by ID (public projection)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(user_id).await?;

    // Never leak private fields to other users
    Ok(Json(UserResponse::from_user(user, false)))
}

/// Total registered accounts
pub async fn count_users(State(state): State<AppState>) -> Result<Json<i64>, AppError> {
    let count = user_service(&state).count_users().await?;
    Ok(Json(count))
}

/// Week-over-week registration growth
pub async fn growth_percent(State(state): State<AppState>) -> Result<Json<f64>, AppError> {
    let percent = user_service(&state).growth_percent().await?;
    Ok(Json(percent))
}

/// Recently registered accounts (admin dashboard)
pub async fn recent_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<RecentUserResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let users = user_service(&state).recent_users().await?;
    Ok(Json(users.into_iter().map(RecentUserResponse::from).collect()))
}

/// Account summaries (admin dashboard)
pub async fn user_summaries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserSummaryResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let users = user_service(&state).all_users().await?;
    Ok(Json(users.into_iter().map(UserSummaryResponse::from).collect()))
}

/// Delete an account (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;

    user_service(&state).delete_user(user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Lock an account (admin)
pub async fn lock_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;

    user_service(&state).set_locked(user_id, true).await?;
    Ok(Json(MessageResponse::new("User locked successfully")))
}

/// Unlock an account (admin)
pub async fn unlock_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;

    user_service(&state).set_locked(user_id, false).await?;
    Ok(Json(MessageResponse::new("User unlocked successfully")))
}

/// Replace a user's roles (admin)
pub async fn update_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateRolesRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;

    let roles: Vec<Role> = body
        .roles
        .iter()
        .map(|r| {
            Role::from_str(r).ok_or_else(|| AppError::BadRequest(format!("Unknown role: {}", r)))
        })
        .collect::<Result<_, _>>()?;

    if roles.is_empty() {
        return Err(AppError::BadRequest("At least one role is required".into()));
    }

    user_service(&state).update_roles(user_id, roles).await?;
    Ok(Json(MessageResponse::new("Roles updated successfully")))
}

/// Reset a user's password (admin)
pub async fn admin_reset_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(body): Json<AdminResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Role::Admin)?;
    body.validate().map_err(validation_error)?;

    user_service(&state)
        .reset_password(user_id, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// Read a user's online status
pub async fn online_status(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<OnlineStatusResponse>, AppError> {
    let user = user_service(&state).get_user(user_id).await?;

    Ok(Json(OnlineStatusResponse {
        user_id: user.id.to_string(),
        is_online: user.online,
        last_active_at: user.last_active_at.map(|t| t.to_rfc3339()),
    }))
}
