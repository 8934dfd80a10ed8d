//! Rate Limiting Middleware
//!
//! Redis-based distributed rate limiting using a sliding window algorithm.

use std::net::IpAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::ErrorResponse;
use crate::startup::AppState;

/// Configuration for rate limiting behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window for this endpoint type
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
    /// Optional burst allowance above base limit
    pub burst_allowance: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 60,
            window_seconds: 60,
            burst_allowance: 10,
        }
    }
}

impl RateLimitConfig {
    /// Build the API-tier configuration from application settings.
    pub fn from_settings(settings: &crate::config::RateLimitSettings) -> Self {
        let window_seconds = 60u64;
        Self {
            requests_per_window: (settings.requests_per_second * window_seconds as f64) as u32,
            window_seconds,
            burst_allowance: settings.burst_size,
        }
    }
}

/// Predefined rate limit configurations for different endpoint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Authentication and direct balance-mutation endpoints.
    /// Lower limits against credential stuffing and abuse.
    Auth,
    /// Standard API endpoints
    Api,
}

impl EndpointType {
    /// Get the rate limit configuration for this endpoint type.
    pub fn config(&self) -> RateLimitConfig {
        match self {
            EndpointType::Auth => RateLimitConfig {
                requests_per_window: 5, // 5 attempts per minute
                window_seconds: 60,
                burst_allowance: 2,
            },
            EndpointType::Api => RateLimitConfig {
                requests_per_window: 60, // 60 requests per minute
                window_seconds: 60,
                burst_allowance: 20,
            },
        }
    }

    /// Get the Redis key prefix for this endpoint type.
    fn key_prefix(&self) -> &'static str {
        match self {
            EndpointType::Auth => "rl:auth",
            EndpointType::Api => "rl:api",
        }
    }
}

/// Information about rate limit status returned to clients.
#[derive(Debug, Serialize)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets
    pub reset_at: i64,
    /// Seconds until the rate limit resets
    pub retry_after: u64,
}

/// Rate limit exceeded error response.
#[derive(Debug, Serialize)]
struct RateLimitExceededResponse {
    #[serde(flatten)]
    error: ErrorResponse,
    rate_limit: RateLimitInfo,
}

/// Redis-based distributed rate limiter using sliding window algorithm.
///
/// Uses a sorted set per identifier: members are unique request markers,
/// scores are millisecond timestamps. The Lua script keeps the
/// remove-count-add sequence atomic under concurrency.
#[derive(Clone)]
pub struct RateLimiter {
    redis: ConnectionManager,
    config: RateLimitConfig,
    key_prefix: String,
}

impl RateLimiter {
    /// Create a rate limiter for a predefined endpoint type.
    pub fn new(redis: ConnectionManager, endpoint_type: EndpointType) -> Self {
        Self {
            redis,
            config: endpoint_type.config(),
            key_prefix: endpoint_type.key_prefix().to_string(),
        }
    }

    /// Create a rate limiter with a custom configuration.
    pub fn with_config(
        redis: ConnectionManager,
        endpoint_type: EndpointType,
        config: RateLimitConfig,
    ) -> Self {
        Self {
            redis,
            config,
            key_prefix: endpoint_type.key_prefix().to_string(),
        }
    }

    /// Check if a request should be allowed.
    ///
    /// Returns `Ok(RateLimitInfo)` if allowed, `Err(RateLimitInfo)` if rate limited.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        let key = format!("{}:{}", self.key_prefix, identifier);
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let window_start = now_ms - window_ms;
        let max_requests = self.config.requests_per_window + self.config.burst_allowance;

        let mut conn = self.redis.clone();

        let script = redis::Script::new(
            r#"
            local key = KEYS[1]
            local now_ms = tonumber(ARGV[1])
            local window_start = tonumber(ARGV[2])
            local max_requests = tonumber(ARGV[3])
            local window_seconds = tonumber(ARGV[4])

            -- Remove entries outside the window
            redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)

            -- Count current entries
            local current_count = redis.call('ZCARD', key)

            if current_count < max_requests then
                -- Add new request with unique member (timestamp:random)
                local member = now_ms .. ':' .. math.random(1000000)
                redis.call('ZADD', key, now_ms, member)
                -- Set expiry to clean up old keys
                redis.call('EXPIRE', key, window_seconds + 1)
                return {1, current_count + 1, max_requests}
            else
                -- Get oldest entry timestamp to calculate retry time
                local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
                local retry_after = 0
                if oldest and #oldest >= 2 then
                    retry_after = oldest[2] + (window_seconds * 1000) - now_ms
                end
                return {0, current_count, max_requests, retry_after}
            end
            "#,
        );

        let result: Vec<i64> = script
            .key(&key)
            .arg(now_ms)
            .arg(window_start)
            .arg(max_requests as i64)
            .arg(self.config.window_seconds as i64)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("Rate limiter Redis error: {}", e);
                // On Redis error, allow the request but log it so Redis
                // outages do not turn into a full service denial
                RateLimitInfo {
                    limit: max_requests,
                    remaining: 1,
                    reset_at: (now_ms / 1000) + self.config.window_seconds as i64,
                    retry_after: 0,
                }
            })?;

        let allowed = result.first().copied().unwrap_or(1) == 1;
        let current_count = result.get(1).copied().unwrap_or(0) as u32;
        let remaining = max_requests.saturating_sub(current_count);
        let reset_at = (now_ms / 1000) + self.config.window_seconds as i64;

        let info = RateLimitInfo {
            limit: max_requests,
            remaining,
            reset_at,
            retry_after: if allowed {
                0
            } else {
                let retry_ms = result.get(3).copied().unwrap_or(0);
                ((retry_ms as f64) / 1000.0).ceil() as u64
            },
        };

        if allowed {
            Ok(info)
        } else {
            Err(info)
        }
    }
}

/// Extract the rate limit identifier from a request.
///
/// Priority: authenticated user id, then X-Forwarded-For, then X-Real-IP,
/// then the connection address.
fn extract_identifier(request: &Request, client_ip: Option<IpAddr>) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", auth_user.user_id);
    }

    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            let ip = first_ip.trim();
            if ip.parse::<IpAddr>().is_ok() {
                return format!("ip:{}", ip);
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if real_ip.parse::<IpAddr>().is_ok() {
            return format!("ip:{}", real_ip);
        }
    }

    match client_ip {
        Some(ip) => format!("ip:{}", ip),
        None => {
            tracing::warn!("Could not determine client identifier for rate limiting");
            "ip:unknown".to_string()
        }
    }
}

/// Rate limiting middleware for authentication endpoints.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Auth).await
}

/// Rate limiting middleware for standard API endpoints.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Api).await
}

/// Internal rate limiting implementation.
async fn rate_limit_inner(
    state: AppState,
    request: Request,
    next: Next,
    endpoint_type: EndpointType,
) -> Response {
    // Connection info is present when served through
    // into_make_service_with_connect_info
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip());
    let identifier = extract_identifier(&request, client_ip);

    // The API tier takes its limits from configuration; the auth tier is
    // fixed and strict
    let limiter = match endpoint_type {
        EndpointType::Api => RateLimiter::with_config(
            state.redis.clone(),
            endpoint_type,
            RateLimitConfig::from_settings(&state.settings.rate_limit),
        ),
        EndpointType::Auth => RateLimiter::new(state.redis.clone(), endpoint_type),
    };

    match limiter.check(&identifier).await {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            tracing::warn!(
                identifier = %identifier,
                endpoint_type = ?endpoint_type,
                "Rate limit exceeded"
            );
            create_rate_limit_response(info)
        }
    }
}

/// Add rate limit headers to a response.
fn add_rate_limit_headers(headers: &mut header::HeaderMap, info: &RateLimitInfo) {
    if let Ok(v) = header::HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

/// Create a 429 Too Many Requests response.
fn create_rate_limit_response(info: RateLimitInfo) -> Response {
    let retry_after = info.retry_after;
    let body = RateLimitExceededResponse {
        error: ErrorResponse {
            code: 10006,
            message: "You are being rate limited. Please slow down.".to_string(),
            errors: None,
        },
        rate_limit: info,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Ok(v) = header::HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, v);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_type_config() {
        // Auth should have stricter limits
        let auth_config = EndpointType::Auth.config();
        let api_config = EndpointType::Api.config();

        assert!(auth_config.requests_per_window < api_config.requests_per_window);
    }

    #[test]
    fn test_rate_limit_config_default() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_window, 60);
        assert_eq!(config.window_seconds, 60);
        assert_eq!(config.burst_allowance, 10);
    }
}
