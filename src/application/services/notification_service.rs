//! Notification Service
//!
//! Persists notifications and fans them out to the push collaborator.
//! Push delivery is best-effort; a failed send never fails the operation
//! that produced the notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Notification, NotificationRepository, UserRepository};
use crate::infrastructure::gateway::PushSender;

/// Notification service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Persist a notification and dispatch it to the push collaborator.
    async fn notify(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        kind: &str,
        action_url: Option<String>,
        ref_id: Option<String>,
    ) -> Result<Notification, NotificationError>;

    async fn mark_read(&self, id: i64) -> Result<Notification, NotificationError>;

    async fn delete(&self, id: i64) -> Result<(), NotificationError>;

    async fn list(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError>;

    async fn unread(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError>;

    async fn by_type(
        &self,
        user_id: i64,
        kind: &str,
    ) -> Result<Vec<Notification>, NotificationError>;

    async fn recent(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError>;

    async fn update_device_token(
        &self,
        user_id: i64,
        device_token: &str,
    ) -> Result<(), NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// NotificationService implementation
pub struct NotificationServiceImpl<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    notification_repo: Arc<N>,
    user_repo: Arc<U>,
    push: Arc<dyn PushSender>,
}

impl<N, U> NotificationServiceImpl<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    pub fn new(notification_repo: Arc<N>, user_repo: Arc<U>, push: Arc<dyn PushSender>) -> Self {
        Self {
            notification_repo,
            user_repo,
            push,
        }
    }
}

#[async_trait]
impl<N, U> NotificationService for NotificationServiceImpl<N, U>
where
    N: NotificationRepository + 'static,
    U: UserRepository + 'static,
{
    async fn notify(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        kind: &str,
        action_url: Option<String>,
        ref_id: Option<String>,
    ) -> Result<Notification, NotificationError> {
        let notification = Notification {
            id: 0,
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            notification_type: kind.to_string(),
            action_url,
            ref_id,
            read: false,
            created_at: Utc::now(),
        };

        let created = self
            .notification_repo
            .create(&notification)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))?;

        self.push
            .send(
                user_id,
                title,
                message,
                kind,
                created.action_url.as_deref(),
                created.ref_id.as_deref(),
            )
            .await;

        Ok(created)
    }

    async fn mark_read(&self, id: i64) -> Result<Notification, NotificationError> {
        self.notification_repo.mark_read(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => NotificationError::NotFound,
            e => NotificationError::Internal(e.to_string()),
        })
    }

    async fn delete(&self, id: i64) -> Result<(), NotificationError> {
        self.notification_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => NotificationError::NotFound,
            e => NotificationError::Internal(e.to_string()),
        })
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
        self.notification_repo
            .find_by_user(user_id)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn unread(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
        self.notification_repo
            .find_unread(user_id)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn by_type(
        &self,
        user_id: i64,
        kind: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.notification_repo
            .find_by_type(user_id, kind)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn recent(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
        self.notification_repo
            .find_recent(user_id)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn update_device_token(
        &self,
        user_id: i64,
        device_token: &str,
    ) -> Result<(), NotificationError> {
        self.user_repo
            .set_device_token(user_id, device_token)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => NotificationError::UserNotFound,
                e => NotificationError::Internal(e.to_string()),
            })
    }
}
