//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Account role. A user may hold several roles at once; a player-companion
/// account carries both `User` and `Player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Player,
    Admin,
}

impl Role {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USER" => Some(Self::User),
            "PLAYER" => Some(Self::Player),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Player => "PLAYER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account in the marketplace.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - coin: BIGINT NOT NULL DEFAULT 0, CHECK (coin >= 0)
/// - roles: TEXT[] NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Full display name
    pub full_name: Option<String>,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// URL to the user's profile cover image
    pub cover_image_url: Option<String>,

    pub phone_number: Option<String>,

    pub address: Option<String>,

    pub bio: Option<String>,

    pub gender: Option<String>,

    /// Wallet balance in coins. Never negative.
    pub coin: i64,

    /// Account roles
    pub roles: Vec<Role>,

    /// Whether the account is enabled (approved)
    pub enabled: bool,

    /// Whether the account is locked by an admin
    pub locked: bool,

    /// Whether the user currently has an active session
    pub online: bool,

    /// Last time any authenticated request was seen
    pub last_active_at: Option<DateTime<Utc>>,

    /// Push notification device token
    #[serde(skip_serializing)]
    pub device_token: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check whether the account holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the account may authenticate.
    pub fn can_login(&self) -> bool {
        self.enabled && !self.locked
    }

    /// Display name, falling back to username if not set.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            full_name: None,
            avatar_url: None,
            cover_image_url: None,
            phone_number: None,
            address: None,
            bio: None,
            gender: None,
            coin: 0,
            roles: vec![Role::User],
            enabled: true,
            locked: false,
            online: false,
            last_active_at: None,
            device_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user by ID.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Total number of registered accounts.
    async fn count(&self) -> Result<i64, AppError>;

    /// Number of accounts created inside the given window.
    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Ten most recently created accounts.
    async fn find_recent(&self) -> Result<Vec<User>, AppError>;

    /// All accounts (admin listings).
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    /// Lock or unlock an account.
    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), AppError>;

    /// Replace the role set of an account.
    async fn set_roles(&self, id: i64, roles: &[Role]) -> Result<(), AppError>;

    /// Replace the password hash of an account.
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    /// Update presence tracking fields.
    async fn set_presence(&self, id: i64, online: bool) -> Result<(), AppError>;

    /// Store the push device token for an account.
    async fn set_device_token(&self, id: i64, device_token: &str) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: 12345678901234567,
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hashed_password".to_string(),
            coin: 500,
            ..User::default()
        }
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Player, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_from_str_is_case_insensitive() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("Player"), Some(Role::Player));
        assert_eq!(Role::from_str("moderator"), None);
    }

    #[test]
    fn test_has_role() {
        let mut user = create_test_user();
        user.roles = vec![Role::User, Role::Player];

        assert!(user.has_role(Role::Player));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn test_can_login_rejects_locked_accounts() {
        let mut user = create_test_user();
        assert!(user.can_login());

        user.locked = true;
        assert!(!user.can_login());

        user.locked = false;
        user.enabled = false;
        assert!(!user.can_login());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = create_test_user();
        assert_eq!(user.display_name(), "testuser");

        user.full_name = Some("Test User".to_string());
        assert_eq!(user.display_name(), "Test User");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = create_test_user();
        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hashed_password"));
    }

    #[test]
    fn test_device_token_not_serialized() {
        let mut user = create_test_user();
        user.device_token = Some("fcm-token".to_string());
        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(!serialized.contains("fcm-token"));
    }
}
