//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::domain::SessionRepository;
use crate::infrastructure::gateway::{PushSender, TracingPushSender};
use crate::infrastructure::repositories::PgSessionRepository;
use crate::infrastructure::{cache, database};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::shared::snowflake::SnowflakeGenerator;

/// How often expired and revoked sessions are purged.
const SESSION_PURGE_INTERVAL_SECS: u64 = 3600;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub push: Arc<dyn PushSender>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        // Apply pending migrations
        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Create Redis client
        let redis = cache::create_redis_client(&settings.redis).await?;
        tracing::info!("Redis connection established");

        // Create snowflake generator
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64, // Default node_id
        ));

        // Push delivery collaborator (log-only by default)
        let push: Arc<dyn PushSender> = Arc::new(TracingPushSender);

        // Create app state
        let state = AppState {
            db,
            redis,
            snowflake,
            push,
            settings: Arc::new(settings.clone()),
        };

        crate::presentation::http::handlers::health::init_server_start();

        // Periodic purge of expired refresh sessions
        let session_repo = PgSessionRepository::new(state.db.clone());
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(
                SESSION_PURGE_INTERVAL_SECS,
            ));
            loop {
                interval.tick().await;
                match session_repo.delete_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "Expired sessions removed"),
                    Err(e) => tracing::warn!("Session purge failed: {}", e),
                }
            }
        });

        // Build router with middleware
        let router = routes::create_router(state.clone())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
