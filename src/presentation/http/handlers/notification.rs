//! Notification Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{DeviceTokenRequest, NotificationRequest};
use crate::application::dto::response::NotificationResponse;
use crate::application::services::{
    NotificationError, NotificationService, NotificationServiceImpl,
};
use crate::domain::Role;
use crate::infrastructure::repositories::{PgNotificationRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound => AppError::NotFound("Notification not found".into()),
            NotificationError::UserNotFound => AppError::NotFound("User not found".into()),
            NotificationError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn notification_service(
    state: &AppState,
) -> NotificationServiceImpl<PgNotificationRepository, PgUserRepository> {
    NotificationServiceImpl::new(
        Arc::new(PgNotificationRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.push.clone(),
    )
}

/// Create a notification manually (admin)
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<NotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), AppError> {
    auth.require(Role::Admin)?;
    body.validate().map_err(validation_error)?;

    let notification = notification_service(&state)
        .notify(
            body.user_id,
            &body.title,
            &body.message,
            &body.notification_type,
            body.action_url,
            body.ref_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse::from(notification)),
    ))
}

/// Mark a notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationResponse>, AppError> {
    let notification = notification_service(&state).mark_read(notification_id).await?;
    Ok(Json(NotificationResponse::from(notification)))
}

/// Delete a notification
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    notification_service(&state).delete(notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All notifications of the caller
pub async fn user_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state).list(auth.user_id).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Unread notifications of the caller
pub async fn unread_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state).unread(auth.user_id).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Notifications of the caller filtered by type
pub async fn notifications_by_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state)
        .by_type(auth.user_id, &kind)
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Latest notifications of the caller
pub async fn recent_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state).recent(auth.user_id).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Register a push device token for the caller
pub async fn update_device_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<DeviceTokenRequest>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(validation_error)?;

    notification_service(&state)
        .update_device_token(auth.user_id, &body.device_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
