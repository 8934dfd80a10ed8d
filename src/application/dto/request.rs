//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth
// ============================================================================

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

// ============================================================================
// Users
// ============================================================================

/// Update own profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 64, message = "Full name must be at most 64 characters"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone_number: Option<String>,

    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Replace a user's role set (admin)
#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<String>,
}

/// Admin password reset
#[derive(Debug, Deserialize, Validate)]
pub struct AdminResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

// ============================================================================
// Games
// ============================================================================

/// Create game request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub requirements: Option<String>,

    #[serde(default)]
    pub has_roles: bool,

    #[serde(default)]
    pub available_roles: Vec<String>,

    #[serde(default)]
    pub available_ranks: Vec<String>,
}

/// Update game request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub requirements: Option<String>,

    #[serde(default)]
    pub has_roles: bool,

    #[serde(default)]
    pub available_roles: Vec<String>,

    #[serde(default)]
    pub available_ranks: Vec<String>,
}

// ============================================================================
// Player listings
// ============================================================================

/// Create listing request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    pub game_id: i64,

    #[validate(length(min = 2, max = 32, message = "Nickname must be 2-32 characters"))]
    pub nickname: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub rank: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[validate(range(min = 1, message = "Hourly rate must be positive"))]
    pub hourly_rate: i64,
}

/// Update listing request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 2, max = 32, message = "Nickname must be 2-32 characters"))]
    pub nickname: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub rank: Option<String>,
    pub roles: Option<Vec<String>>,

    #[validate(range(min = 1, message = "Hourly rate must be positive"))]
    pub hourly_rate: Option<i64>,

    pub available: Option<bool>,
}

// ============================================================================
// Wallet & payments
// ============================================================================

/// Direct top-up request
#[derive(Debug, Deserialize, Validate)]
pub struct TopUpRequest {
    #[validate(range(min = 1, message = "Coin must be positive"))]
    pub coin: i64,
}

/// Withdraw request
#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    #[validate(range(min = 1, message = "Coin must be positive"))]
    pub coin: i64,
}

/// Hire request
#[derive(Debug, Deserialize, Validate)]
pub struct HireRequest {
    pub game_player_id: i64,

    #[validate(range(min = 1, max = 24, message = "Hours must be between 1 and 24"))]
    pub hours: i64,
}

/// Donation request
#[derive(Debug, Deserialize, Validate)]
pub struct DonateRequest {
    pub game_player_id: i64,

    #[validate(range(min = 1, message = "Coin must be positive"))]
    pub coin: i64,
}

/// Deposit instructions request
#[derive(Debug, Deserialize, Validate)]
pub struct DepositRequest {
    #[validate(range(min = 1, message = "Coin must be positive"))]
    pub coin: i64,

    #[validate(length(min = 1, message = "Payment method is required"))]
    pub method: String,
}

/// VNPay checkout creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVnPayRequest {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount: i64,

    #[validate(length(min = 1, max = 255, message = "Order info must be 1-255 characters"))]
    pub order_info: String,
}

/// Review request for a finished hire
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Date range query parameters (ISO 8601 timestamps)
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// Moments & reports & notifications
// ============================================================================

/// Create or update moment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMomentRequest {
    #[validate(length(min = 1, max = 1000, message = "Content must be 1-1000 characters"))]
    pub content: String,

    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// File a report request
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    pub reported_player_id: i64,

    #[validate(length(min = 1, max = 100, message = "Reason must be 1-100 characters"))]
    pub reason: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,

    pub video: Option<String>,
}

/// Moderator status update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReportStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    pub resolution: Option<String>,
}

/// Manual notification creation request
#[derive(Debug, Deserialize, Validate)]
pub struct NotificationRequest {
    pub user_id: i64,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message: String,

    #[validate(length(min = 1, max = 32, message = "Type must be 1-32 characters"))]
    #[serde(rename = "type")]
    pub notification_type: String,

    pub action_url: Option<String>,
    pub ref_id: Option<String>,
}

/// Push device token registration request
#[derive(Debug, Deserialize, Validate)]
pub struct DeviceTokenRequest {
    #[validate(length(min = 1, message = "Device token is required"))]
    pub device_token: String,
}
