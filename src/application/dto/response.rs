//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{
    Game, GamePlayer, HireOrder, Moment, Notification, Payment, PaymentStatus, PlayerReview,
    Report, User,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (includes user and tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// User response
///
/// Private fields (email, wallet balance, contact data) are only included
/// for the account owner or an admin.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: User, include_private: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: if include_private { Some(user.email) } else { None },
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            bio: user.bio,
            gender: user.gender,
            phone_number: if include_private { user.phone_number } else { None },
            address: if include_private { user.address } else { None },
            coin: if include_private { Some(user.coin) } else { None },
            roles: if include_private {
                Some(user.roles.iter().map(|r| r.as_str().to_string()).collect())
            } else {
                None
            },
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Account status label for admin dashboards.
fn account_status(user: &User) -> &'static str {
    match (user.enabled, user.locked) {
        (true, false) => "Active",
        (true, true) => "Locked",
        (false, false) => "Pending approval",
        (false, true) => "Inactive",
    }
}

/// Recent user row for the admin dashboard
#[derive(Debug, Serialize)]
pub struct RecentUserResponse {
    pub full_name: Option<String>,
    pub email: String,
    pub role: String,
    pub status: String,
    pub joined_date: String,
    pub balance: i64,
}

impl From<User> for RecentUserResponse {
    fn from(user: User) -> Self {
        Self {
            role: user
                .roles
                .first()
                .map(|r| r.as_str().to_string())
                .unwrap_or_else(|| "USER".to_string()),
            status: account_status(&user).to_string(),
            joined_date: user.created_at.date_naive().to_string(),
            balance: user.coin,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

/// User summary row for the admin dashboard
#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub full_name: Option<String>,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_date: String,
}

impl From<User> for UserSummaryResponse {
    fn from(user: User) -> Self {
        Self {
            role: user
                .roles
                .first()
                .map(|r| r.as_str().to_string())
                .unwrap_or_else(|| "USER".to_string()),
            status: account_status(&user).to_string(),
            created_date: user.created_at.date_naive().to_string(),
            full_name: user.full_name,
            email: user.email,
        }
    }
}

/// Online status response
#[derive(Debug, Serialize)]
pub struct OnlineStatusResponse {
    pub user_id: String,
    pub is_online: bool,
    pub last_active_at: Option<String>,
}

/// Game response with registered player count
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: String,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub player_count: i64,
    pub has_roles: bool,
    pub available_roles: Vec<String>,
    pub available_ranks: Vec<String>,
}

impl GameResponse {
    pub fn from_game(game: Game, player_count: i64) -> Self {
        Self {
            id: game.id.to_string(),
            name: game.name,
            description: game.description,
            category: game.category,
            platform: game.platform,
            status: game.status.as_str().to_string(),
            image_url: game.image_url,
            website_url: game.website_url,
            player_count,
            has_roles: game.has_roles,
            available_roles: game.available_roles,
            available_ranks: game.available_ranks,
        }
    }
}

/// Player listing response
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub nickname: String,
    pub description: Option<String>,
    pub rank: Option<String>,
    pub roles: Vec<String>,
    pub hourly_rate: i64,
    pub available: bool,
    pub hire_count: i64,
    pub created_at: String,
}

impl From<GamePlayer> for ListingResponse {
    fn from(player: GamePlayer) -> Self {
        Self {
            id: player.id.to_string(),
            user_id: player.user_id.to_string(),
            game_id: player.game_id.to_string(),
            nickname: player.nickname,
            description: player.description,
            rank: player.rank,
            roles: player.roles,
            hourly_rate: player.hourly_rate,
            available: player.available,
            hire_count: player.hire_count,
            created_at: player.created_at.to_rfc3339(),
        }
    }
}

/// Payment ledger row response
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub user_id: String,
    pub game_player_id: Option<String>,
    pub coin: i64,
    pub currency: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub method: String,
    pub status: String,
    pub txn_ref: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            user_id: payment.user_id.to_string(),
            game_player_id: payment.game_player_id.map(|id| id.to_string()),
            coin: payment.coin,
            currency: payment.currency,
            payment_type: payment.payment_type.as_str().to_string(),
            method: payment.method.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            txn_ref: payment.vnp_txn_ref,
            description: payment.description,
            start_time: payment.start_time.map(|t| t.to_rfc3339()),
            end_time: payment.end_time.map(|t| t.to_rfc3339()),
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// Top-up history row with display status
#[derive(Debug, Serialize)]
pub struct TopupHistoryResponse {
    pub id: String,
    pub date_time: String,
    pub coin: i64,
    pub method: String,
    pub status: String,
    pub status_text: String,
    pub status_color: String,
}

impl From<Payment> for TopupHistoryResponse {
    fn from(payment: Payment) -> Self {
        let (status_text, status_color) = match payment.status {
            PaymentStatus::Completed => ("Completed", "#4CAF50"),
            PaymentStatus::Pending => ("Processing", "#FFA500"),
            PaymentStatus::Failed => ("Failed", "#F44336"),
            PaymentStatus::Refunded => ("Refunded", "#9E9E9E"),
        };

        Self {
            id: payment.id.to_string(),
            date_time: payment.created_at.to_rfc3339(),
            coin: payment.coin,
            method: payment.method.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            status_text: status_text.to_string(),
            status_color: status_color.to_string(),
        }
    }
}

/// Wallet balance response
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub coin: i64,
}

/// VNPay checkout creation response
#[derive(Debug, Serialize)]
pub struct VnPayCreateResponse {
    pub payment_url: String,
    pub txn_ref: String,
    pub payment_id: String,
}

/// Deposit instructions response
#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_content: Option<String>,
}

/// Hire response (payment plus order)
#[derive(Debug, Serialize)]
pub struct HireResponse {
    pub payment: PaymentResponse,
    pub order_id: String,
    pub hours: i64,
}

impl HireResponse {
    pub fn from_parts(payment: Payment, order: HireOrder) -> Self {
        Self {
            payment: PaymentResponse::from(payment),
            order_id: order.id.to_string(),
            hours: order.hours,
        }
    }
}

/// Moment response
#[derive(Debug, Serialize)]
pub struct MomentResponse {
    pub id: String,
    pub game_player_id: String,
    pub content: String,
    pub status: String,
    pub image_urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Moment> for MomentResponse {
    fn from(moment: Moment) -> Self {
        Self {
            id: moment.id.to_string(),
            game_player_id: moment.game_player_id.to_string(),
            content: moment.content,
            status: moment.status.as_str().to_string(),
            image_urls: moment.image_urls,
            created_at: moment.created_at.to_rfc3339(),
            updated_at: moment.updated_at.to_rfc3339(),
        }
    }
}

/// Review response
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub game_player_id: String,
    pub reviewer_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<PlayerReview> for ReviewResponse {
    fn from(review: PlayerReview) -> Self {
        Self {
            id: review.id.to_string(),
            game_player_id: review.game_player_id.to_string(),
            reviewer_id: review.reviewer_id.to_string(),
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// Aggregated reviews of a player
#[derive(Debug, Serialize)]
pub struct PlayerReviewsResponse {
    pub reviews: Vec<ReviewResponse>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// Report response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub reported_player_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub description: String,
    pub video_url: Option<String>,
    pub status: String,
    pub resolution: Option<String>,
    pub created_at: String,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id.to_string(),
            reported_player_id: report.reported_player_id.to_string(),
            reporter_id: report.reporter_id.to_string(),
            reason: report.reason,
            description: report.description,
            video_url: report.video_url,
            status: report.status.as_str().to_string(),
            resolution: report.resolution,
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

/// Report counts for the admin dashboard
#[derive(Debug, Serialize)]
pub struct ReportSummaryResponse {
    pub total: i64,
    pub unprocessed: i64,
}

/// Notification response
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub action_url: Option<String>,
    pub ref_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            user_id: notification.user_id.to_string(),
            title: notification.title,
            message: notification.message,
            notification_type: notification.notification_type,
            action_url: notification.action_url,
            ref_id: notification.ref_id,
            read: notification.read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
