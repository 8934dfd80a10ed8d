//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table. Push delivery itself lives behind the
//! `PushSender` collaborator in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// An in-app notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    /// Free-form kind tag ("topup", "withdraw", "hire", "moment", ...)
    pub notification_type: String,
    /// In-app route the client should open
    pub action_url: Option<String>,
    /// Identifier of the referenced object (payment id, moment id, ...)
    pub ref_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;

    async fn mark_read(&self, id: i64) -> Result<Notification, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// All notifications of a user, newest first.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Notification>, AppError>;

    async fn find_unread(&self, user_id: i64) -> Result<Vec<Notification>, AppError>;

    async fn find_by_type(
        &self,
        user_id: i64,
        notification_type: &str,
    ) -> Result<Vec<Notification>, AppError>;

    /// Latest ten notifications of a user.
    async fn find_recent(&self, user_id: i64) -> Result<Vec<Notification>, AppError>;
}
