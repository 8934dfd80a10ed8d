//! Payment & Wallet Handlers
//!
//! The wallet endpoints: balance, top-up, withdraw, hire, donate, refund,
//! gateway checkout/return, deposit instructions, histories, and the
//! post-hire review endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    CreateVnPayRequest, DateRangeParams, DepositRequest, DonateRequest, HireRequest,
    ReviewRequest, TopUpRequest, WithdrawRequest,
};
use crate::application::dto::response::{
    BalanceResponse, DepositResponse, HireResponse, PaymentResponse, PlayerReviewsResponse,
    ReviewResponse, TopupHistoryResponse, VnPayCreateResponse,
};
use crate::application::services::{
    DepositInstructions, NotificationServiceImpl, ReviewError, ReviewService, ReviewServiceImpl,
    WalletError, WalletService, WalletServiceImpl,
};
use crate::domain::{PaymentStatus, Role};
use crate::infrastructure::gateway::VnPayGateway;
use crate::infrastructure::repositories::{
    PgGamePlayerRepository, PgNotificationRepository, PgPaymentRepository, PgReviewRepository,
    PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<WalletError> for AppError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::UserNotFound => AppError::NotFound("User not found".into()),
            WalletError::PaymentNotFound => AppError::NotFound("Payment not found".into()),
            WalletError::ListingNotFound => AppError::NotFound("Listing not found".into()),
            WalletError::ListingUnavailable => {
                AppError::Conflict("Listing is not accepting hires".into())
            }
            WalletError::SelfTarget => {
                AppError::BadRequest("Cannot target your own listing".into())
            }
            WalletError::InvalidAmount => {
                AppError::BadRequest("Coin amount must be positive".into())
            }
            WalletError::InsufficientBalance => AppError::InsufficientBalance,
            WalletError::NotRefundable => {
                AppError::Conflict("Payment is not a refundable hire".into())
            }
            WalletError::InvalidSignature => {
                AppError::BadRequest("Invalid gateway signature".into())
            }
            WalletError::MalformedCallback(msg) => AppError::BadRequest(msg),
            WalletError::UnknownMethod(m) => {
                AppError::BadRequest(format!("Unsupported payment method: {}", m))
            }
            WalletError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::PaymentNotFound => AppError::NotFound("Payment not found".into()),
            ReviewError::OrderNotFound => {
                AppError::NotFound("No hire order for this payment".into())
            }
            ReviewError::NotHirer => AppError::Forbidden("Only the hirer may review".into()),
            ReviewError::HireNotFinished => {
                AppError::BadRequest("The hire has not finished yet".into())
            }
            ReviewError::AlreadyReviewed => {
                AppError::Conflict("This hire has already been reviewed".into())
            }
            ReviewError::InvalidRating => {
                AppError::BadRequest("Rating must be between 1 and 5".into())
            }
            ReviewError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type AppWalletService = WalletServiceImpl<
    PgPaymentRepository,
    PgUserRepository,
    PgGamePlayerRepository,
    NotificationServiceImpl<PgNotificationRepository, PgUserRepository>,
>;

/// Build the wallet service from application state.
fn wallet_service(state: &AppState) -> AppWalletService {
    let notifications = NotificationServiceImpl::new(
        Arc::new(PgNotificationRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.push.clone(),
    );

    WalletServiceImpl::new(
        Arc::new(PgPaymentRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgGamePlayerRepository::new(state.db.clone())),
        Arc::new(notifications),
        VnPayGateway::new(state.settings.vnpay.clone()),
        state.settings.bank.clone(),
    )
}

fn review_service(state: &AppState) -> ReviewServiceImpl<PgReviewRepository, PgPaymentRepository> {
    ReviewServiceImpl::new(
        Arc::new(PgReviewRepository::new(state.db.clone())),
        Arc::new(PgPaymentRepository::new(state.db.clone())),
    )
}

/// Current wallet balance
pub async fn wallet_balance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BalanceResponse>, AppError> {
    let coin = wallet_service(&state).balance(auth.user_id).await?;
    Ok(Json(BalanceResponse { coin }))
}

/// Direct top-up
pub async fn top_up(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<TopUpRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let payment = wallet_service(&state).top_up(auth.user_id, body.coin).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Withdraw coins (players only)
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<WithdrawRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    auth.require(Role::Player)?;
    body.validate().map_err(validation_error)?;

    let payment = wallet_service(&state)
        .withdraw(auth.user_id, body.coin)
        .await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Hire a player-companion
pub async fn hire(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<HireRequest>,
) -> Result<(StatusCode, Json<HireResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let (payment, order) = wallet_service(&state)
        .hire(auth.user_id, body.game_player_id, body.hours)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(HireResponse::from_parts(payment, order)),
    ))
}

/// Donate to a player
pub async fn donate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<DonateRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let payment = wallet_service(&state)
        .donate(auth.user_id, body.game_player_id, body.coin)
        .await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Refund a completed hire (admin)
pub async fn refund(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(payment_id): Path<i64>,
) -> Result<Json<PaymentResponse>, AppError> {
    auth.require(Role::Admin)?;

    let payment = wallet_service(&state).refund(payment_id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Best-effort client IP for the gateway request (proxy headers first).
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|ip| ip.to_string())
        })
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Create a VNPay checkout URL
pub async fn create_vnpay(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    Json(body): Json<CreateVnPayRequest>,
) -> Result<Json<VnPayCreateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let client_ip = client_ip(&headers);

    let checkout = wallet_service(&state)
        .create_vnpay_topup(auth.user_id, body.amount, &body.order_info, &client_ip)
        .await?;

    Ok(Json(VnPayCreateResponse {
        payment_url: checkout.payment_url,
        txn_ref: checkout.txn_ref,
        payment_id: checkout.payment_id.to_string(),
    }))
}

/// VNPay return callback (public; the gateway redirects the browser here)
pub async fn vnpay_return(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let result = wallet_service(&state).vnpay_return(params).await?;

    if result.payment.status == PaymentStatus::Completed {
        let html = format!(
            "<html><head><title>Payment successful</title></head><body>\
             <h2>Payment successful!</h2>\
             <p>You added <b>{}</b> coins.</p>\
             <p>Transaction ref: <b>{}</b></p>\
             </body></html>",
            result.payment.coin,
            result.payment.vnp_txn_ref.as_deref().unwrap_or("-")
        );
        Ok(Html(html).into_response())
    } else {
        Ok((StatusCode::OK, "Payment failed").into_response())
    }
}

/// Deposit instructions (QR wallets and bank transfer)
pub async fn deposit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<DepositRequest>,
) -> Result<Json<DepositResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let instructions = wallet_service(&state)
        .deposit_instructions(auth.user_id, body.coin, &body.method)
        .await?;

    let response = match instructions {
        DepositInstructions::Qr { method, qr_code, .. } => DepositResponse {
            message: format!("Scan the QR code with the {} app to pay", method.as_str()),
            qr_code: Some(qr_code),
            bank_account: None,
            bank_name: None,
            bank_owner: None,
            transfer_content: None,
        },
        DepositInstructions::Bank { instructions, .. } => DepositResponse {
            message: "Transfer with the exact reference to be credited automatically".to_string(),
            qr_code: None,
            bank_account: Some(instructions.bank_account),
            bank_name: Some(instructions.bank_name),
            bank_owner: Some(instructions.bank_owner),
            transfer_content: Some(instructions.transfer_content),
        },
    };

    Ok(Json(response))
}

/// Top-up history of the caller
pub async fn topup_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<TopupHistoryResponse>>, AppError> {
    let payments = wallet_service(&state).topup_history(auth.user_id).await?;
    Ok(Json(
        payments.into_iter().map(TopupHistoryResponse::from).collect(),
    ))
}

/// Hires made by the caller
pub async fn hire_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = wallet_service(&state).hire_history(auth.user_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Hires received by a listing
pub async fn player_hire_history(
    State(state): State<AppState>,
    Path(game_player_id): Path<i64>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = wallet_service(&state)
        .player_hire_history(game_player_id)
        .await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Full payment history of the caller
pub async fn user_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = wallet_service(&state).user_payments(auth.user_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Payments by status (admin)
pub async fn payments_by_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(status): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let status = PaymentStatus::from_str(&status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown payment status: {}", status)))?;

    let payments = wallet_service(&state).payments_by_status(status).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Payments inside a date range (admin)
pub async fn payments_by_date_range(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(range): Query<DateRangeParams>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let payments = wallet_service(&state)
        .payments_by_date_range(range.start, range.end)
        .await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Review the player hired through a payment
pub async fn review_hire(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(payment_id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let review = review_service(&state)
        .review_hire(auth.user_id, payment_id, body.rating, body.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// Reviews of a player listing (public)
pub async fn player_reviews(
    State(state): State<AppState>,
    Path(game_player_id): Path<i64>,
) -> Result<Json<PlayerReviewsResponse>, AppError> {
    let reviews = review_service(&state).player_reviews(game_player_id).await?;

    Ok(Json(PlayerReviewsResponse {
        reviews: reviews
            .reviews
            .into_iter()
            .map(ReviewResponse::from)
            .collect(),
        average_rating: reviews.average_rating,
        review_count: reviews.review_count,
    }))
}
