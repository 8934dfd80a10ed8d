//! Authentication API Tests
//!
//! Request validation runs before any service call, so the DTO rules are
//! exercised directly; full register/login round trips need the test
//! database wired into `TestApp`.

use validator::Validate;

use gamebuddy_server::application::dto::request::{LoginRequest, RegisterRequest};

use crate::common::{unique_email, unique_username};

fn register_body(username: &str, email: &str, password: &str) -> RegisterRequest {
    serde_json::from_value(serde_json::json!({
        "username": username,
        "email": email,
        "password": password,
    }))
    .expect("valid register JSON")
}

#[test]
fn test_register_request_accepts_valid_data() {
    let body = register_body(&unique_username(), &unique_email(), "ValidPassword123!");
    assert!(body.validate().is_ok());
}

#[test]
fn test_register_request_rejects_invalid_email() {
    let body = register_body("testuser", "not-an-email", "ValidPassword123!");
    let errors = body.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("email"));
}

#[test]
fn test_register_request_rejects_short_password() {
    let body = register_body("testuser", "test@example.com", "short");
    let errors = body.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("password"));
}

#[test]
fn test_register_request_rejects_short_username() {
    let body = register_body("x", "test@example.com", "ValidPassword123!");
    let errors = body.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("username"));
}

#[test]
fn test_login_request_rejects_invalid_email() {
    let body: LoginRequest = serde_json::from_value(serde_json::json!({
        "email": "nope",
        "password": "ValidPassword123!",
    }))
    .unwrap();

    assert!(body.validate().is_err());
}

/// Test login with valid credentials (requires database)
#[tokio::test]
async fn test_login_with_valid_credentials() {
    // Arrange - register user first
    // let app = TestApp::new().await;
    // let email = unique_email();
    // Register user...

    // Act
    // let body = json!({ "email": email, "password": password });
    // let response = app.post_json("/api/v1/auth/login", &body.to_string()).await;

    // Assert
    // assert_eq!(response.status(), StatusCode::OK);
}

/// Test protected endpoint requires token (requires database)
#[tokio::test]
async fn test_protected_endpoint_requires_auth() {
    // Arrange
    // let app = TestApp::new().await;

    // Act - try to access protected endpoint without token
    // let response = app.get("/api/v1/users/@me").await;

    // Assert
    // assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
