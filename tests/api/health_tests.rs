//! Health Endpoint Tests

use gamebuddy_server::presentation::http::handlers::health;

#[tokio::test]
async fn test_health_check_reports_healthy() {
    let response = health::health_check().await;
    assert_eq!(response.0.status, "healthy");
    assert_eq!(response.0.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_reports_alive() {
    let response = health::liveness().await;
    assert_eq!(response.0.status, "alive");
}
