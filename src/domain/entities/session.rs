//! Session and password-reset entities.
//!
//! Sessions store hashed refresh tokens; the raw token is never persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A refresh-token session.
///
/// Maps to the `sessions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex digest of the opaque refresh token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i64, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            user_id,
            token_hash,
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        }
    }

    /// A session is active while unrevoked and unexpired.
    pub fn is_active(&self) -> bool {
        !self.revoked && self.expires_at > Utc::now()
    }
}

/// Repository trait for session data access.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Rotate the refresh token stored for a session.
    async fn update_token_hash(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn revoke(&self, id: i64) -> Result<(), AppError>;

    /// Remove expired and revoked sessions.
    async fn delete_expired(&self) -> Result<u64, AppError>;
}

/// A single-use password reset token.
///
/// Maps to the `password_reset_tokens` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex digest of the token mailed to the user
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Repository trait for password reset tokens.
#[async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    async fn create(&self, token: &PasswordResetToken) -> Result<PasswordResetToken, AppError>;

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, AppError>;

    /// Remove every outstanding token of a user (issued or consumed).
    async fn delete_for_user(&self, user_id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_active_window() {
        let mut session = Session::new(1, "hash".into(), Utc::now() + Duration::days(7));
        assert!(session.is_active());

        session.revoked = true;
        assert!(!session.is_active());

        session.revoked = false;
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(!session.is_active());
    }

    #[test]
    fn test_reset_token_expiry() {
        let token = PasswordResetToken {
            id: 1,
            user_id: 1,
            token_hash: "hash".into(),
            expires_at: Utc::now() - Duration::minutes(1),
            created_at: Utc::now(),
        };
        assert!(token.is_expired());
    }
}
