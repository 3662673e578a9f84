use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use patrol_api::config::ServerConfig;
use patrol_api::registry::SessionRegistry;
use patrol_api::router::build_app_router;
use patrol_api::state::AppState;
use patrol_db::PgStore;
use patrol_engine::PatrolEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on flushing active sessions during shutdown.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "patrol_api=debug,patrol_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        autosave_interval_secs = config.engine.autosave_interval.as_secs(),
        location_timeout_secs = config.engine.location_timeout.as_secs(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = patrol_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    patrol_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    patrol_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Engine ---
    let store = Arc::new(PgStore::new(pool.clone()));
    let engine = PatrolEngine::new(store.clone(), store, config.engine.clone());
    let registry = Arc::new(SessionRegistry::new());

    // --- App state ---
    let state = AppState {
        engine,
        registry: Arc::clone(&registry),
        config: Arc::new(config.clone()),
        pool: Some(pool),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, flushing active patrols");
    if tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, flush_active(&registry))
        .await
        .is_err()
    {
        tracing::warn!("Timed out flushing active patrols");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Save every active patrol's progress and stop its autosave.
async fn flush_active(registry: &SessionRegistry) {
    let active = registry.drain().await;
    tracing::info!(count = active.len(), "Flushing active patrols");

    for shared in active {
        let patrol = shared.lock().await;
        if let Err(e) = patrol.save_progress().await {
            tracing::warn!(session_id = %patrol.id(), error = %e, "Failed to flush patrol");
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
