//! Route Configuration
//!
//! Configures all HTTP routes for the API. Mixed public/protected groups
//! are built from two routers merged together: the authentication
//! middleware is baked into the protected half only.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, rate_limit_api, rate_limit_auth,
};
use crate::presentation::middleware::logging::track_metrics;
use crate::presentation::middleware::security::security_headers;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Request metrics and security headers on all responses
        .layer(middleware::from_fn(track_metrics))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (auth has its own stricter rate limiting)
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/games", game_routes(state.clone()))
        .nest("/players", player_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/moments", moment_routes(state.clone()))
        .nest("/reports", report_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        // Apply API rate limiting to all API routes
        .route_layer(middleware::from_fn_with_state(state, rate_limit_api))
}

/// Authentication routes (public, with stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route(
            "/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        // Apply stricter auth rate limiting
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// User routes (public projections plus protected account management)
fn user_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/count", get(handlers::user::count_users))
        .route("/growth-percent", get(handlers::user::growth_percent))
        .route("/{user_id}", get(handlers::user::get_user))
        .route("/{user_id}/online-status", get(handlers::user::online_status));

    let protected = Router::new()
        .route("/@me", get(handlers::user::get_current_user))
        .route("/@me", patch(handlers::user::update_current_user))
        .route("/recent", get(handlers::user::recent_users))
        .route("/summary", get(handlers::user::user_summaries))
        .route("/{user_id}", delete(handlers::user::delete_user))
        .route("/{user_id}/lock", patch(handlers::user::lock_user))
        .route("/{user_id}/unlock", patch(handlers::user::unlock_user))
        .route("/{user_id}/roles", put(handlers::user::update_roles))
        .route(
            "/{user_id}/reset-password",
            post(handlers::user::admin_reset_password),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Game catalog routes (public browse, admin management)
fn game_routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(handlers::game::list_games));

    let protected = Router::new()
        .route("/", post(handlers::game::create_game))
        .route("/{game_id}", put(handlers::game::update_game))
        .route("/{game_id}", delete(handlers::game::delete_game))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Player listing routes (public browse, protected management)
fn player_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/game/{game_id}", get(handlers::player::browse_by_game))
        .route("/{listing_id}", get(handlers::player::get_listing))
        .route("/{listing_id}/stats", get(handlers::player::listing_stats));

    let protected = Router::new()
        .route("/", post(handlers::player::register_listing))
        .route("/@me", get(handlers::player::my_listings))
        .route("/summary", get(handlers::player::listing_summaries))
        .route("/{listing_id}", patch(handlers::player::update_listing))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Wallet and payment routes
fn payment_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // The gateway redirects the user's browser here; it carries its own
        // HMAC authentication
        .route("/vnpay-return", get(handlers::payment::vnpay_return))
        .route(
            "/hire/player/{game_player_id}/reviews",
            get(handlers::payment::player_reviews),
        );

    let protected = Router::new()
        .route("/wallet-balance", get(handlers::payment::wallet_balance))
        .route(
            "/topup",
            post(handlers::payment::top_up).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth,
            )),
        )
        .route("/withdraw", post(handlers::payment::withdraw))
        .route("/hire", post(handlers::payment::hire))
        .route("/donate", post(handlers::payment::donate))
        .route("/{payment_id}/refund", post(handlers::payment::refund))
        .route("/vnpay/create", post(handlers::payment::create_vnpay))
        .route("/deposit", post(handlers::payment::deposit))
        .route("/topup-history", get(handlers::payment::topup_history))
        .route("/hire/history", get(handlers::payment::hire_history))
        .route(
            "/hire/player/{game_player_id}",
            get(handlers::payment::player_hire_history),
        )
        .route(
            "/hire/{payment_id}/review",
            post(handlers::payment::review_hire),
        )
        .route("/user", get(handlers::payment::user_payments))
        .route("/status/{status}", get(handlers::payment::payments_by_status))
        .route(
            "/date-range",
            get(handlers::payment::payments_by_date_range),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Moment and follow routes
fn moment_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handlers::moment::all_moments))
        .route("/{moment_id}", get(handlers::moment::get_moment))
        .route(
            "/player/{game_player_id}",
            get(handlers::moment::moments_by_player),
        )
        .route(
            "/player/{game_player_id}/followers/count",
            get(handlers::moment::follower_count),
        );

    let protected = Router::new()
        .route(
            "/player/{game_player_id}",
            post(handlers::moment::create_moment),
        )
        .route("/@me", get(handlers::moment::my_moments))
        .route("/feed", get(handlers::moment::moment_feed))
        .route("/{moment_id}", put(handlers::moment::update_moment))
        .route("/{moment_id}", delete(handlers::moment::delete_moment))
        .route(
            "/{moment_id}/visibility",
            patch(handlers::moment::toggle_moment_visibility),
        )
        .route(
            "/player/{game_player_id}/follow",
            post(handlers::moment::follow_player),
        )
        .route(
            "/player/{game_player_id}/follow",
            delete(handlers::moment::unfollow_player),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Report routes
fn report_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route(
            "/reported-player/{reported_player_id}",
            get(handlers::report::reports_by_reported_player),
        )
        .route("/status/{status}", get(handlers::report::reports_by_status));

    let protected = Router::new()
        .route("/", post(handlers::report::create_report))
        .route("/", get(handlers::report::all_reports))
        .route("/reporter", get(handlers::report::reports_by_reporter))
        .route("/active", get(handlers::report::active_reports))
        .route("/summary", get(handlers::report::report_summary))
        .route("/{report_id}", delete(handlers::report::delete_report))
        .route(
            "/{report_id}/status",
            put(handlers::report::update_report_status),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// Notification routes (all protected)
fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::notification::create_notification))
        .route("/user", get(handlers::notification::user_notifications))
        .route("/unread", get(handlers::notification::unread_notifications))
        .route("/recent", get(handlers::notification::recent_notifications))
        .route("/type/{kind}", get(handlers::notification::notifications_by_type))
        .route(
            "/device-token",
            post(handlers::notification::update_device_token),
        )
        .route("/{notification_id}/read", put(handlers::notification::mark_read))
        .route(
            "/{notification_id}",
            delete(handlers::notification::delete_notification),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
