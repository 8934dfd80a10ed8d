//! User Service
//!
//! Handles profile management and the admin account operations.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::{Role, User, UserRepository};

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<User, UserError>;

    /// Update own profile fields
    async fn update_profile(&self, user_id: i64, update: UpdateProfileDto)
        -> Result<User, UserError>;

    async fn count_users(&self) -> Result<i64, UserError>;

    /// Week-over-week growth of new registrations, in percent
    async fn growth_percent(&self) -> Result<f64, UserError>;

    /// Ten most recently registered accounts
    async fn recent_users(&self) -> Result<Vec<User>, UserError>;

    async fn all_users(&self) -> Result<Vec<User>, UserError>;

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError>;

    async fn set_locked(&self, user_id: i64, locked: bool) -> Result<(), UserError>;

    async fn update_roles(&self, user_id: i64, roles: Vec<Role>) -> Result<(), UserError>;

    /// Admin password reset
    async fn reset_password(&self, user_id: i64, new_password: &str) -> Result<(), UserError>;
}

/// Update profile request
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already taken")]
    EmailTaken,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileDto,
    ) -> Result<User, UserError> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)?;

        if let Some(ref new_email) = update.email {
            if new_email != &user.email {
                let exists = self
                    .user_repo
                    .email_exists(new_email)
                    .await
                    .map_err(|e| UserError::Internal(e.to_string()))?;

                if exists {
                    return Err(UserError::EmailTaken);
                }
                user.email = new_email.clone();
            }
        }

        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(phone_number) = update.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(cover_image_url) = update.cover_image_url {
            user.cover_image_url = Some(cover_image_url);
        }

        self.user_repo
            .update(&user)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn count_users(&self) -> Result<i64, UserError> {
        self.user_repo
            .count()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn growth_percent(&self) -> Result<f64, UserError> {
        let now = Utc::now();
        let week_ago = now - Duration::days(7);
        let two_weeks_ago = now - Duration::days(14);

        let this_week = self
            .user_repo
            .count_created_between(week_ago, now)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;
        let last_week = self
            .user_repo
            .count_created_between(two_weeks_ago, week_ago)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        if last_week == 0 {
            // No baseline: any signups this week count as full growth
            return Ok(if this_week > 0 { 100.0 } else { 0.0 });
        }

        Ok((this_week - last_week) as f64 / last_week as f64 * 100.0)
    }

    async fn recent_users(&self) -> Result<Vec<User>, UserError> {
        self.user_repo
            .find_recent()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn all_users(&self) -> Result<Vec<User>, UserError> {
        self.user_repo
            .find_all()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError> {
        self.user_repo.delete(user_id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => UserError::NotFound,
            e => UserError::Internal(e.to_string()),
        })
    }

    async fn set_locked(&self, user_id: i64, locked: bool) -> Result<(), UserError> {
        self.user_repo
            .set_locked(user_id, locked)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => UserError::NotFound,
                e => UserError::Internal(e.to_string()),
            })
    }

    async fn update_roles(&self, user_id: i64, roles: Vec<Role>) -> Result<(), UserError> {
        self.user_repo
            .set_roles(user_id, &roles)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => UserError::NotFound,
                e => UserError::Internal(e.to_string()),
            })
    }

    async fn reset_password(&self, user_id: i64, new_password: &str) -> Result<(), UserError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::Internal(format!("Password hashing failed: {}", e)))?;

        self.user_repo
            .set_password_hash(user_id, &password_hash)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => UserError::NotFound,
                e => UserError::Internal(e.to_string()),
            })
    }
}
