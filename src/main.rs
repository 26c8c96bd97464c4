//! MemberHub server: membership API core.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use memberhub_api::{AppState, Backends};
use memberhub_auth::{ActivityRecorder, GoogleIdTokenVerifier, GoogleOAuthClient, SessionCleanup};
use memberhub_core::config::AppConfig;
use memberhub_core::error::AppError;
use memberhub_database::DatabasePool;
use memberhub_database::repositories::{
    ApiKeyRepository, MemberRepository, RoleRepository, SessionRepository,
};

/// Timeout for calls to Google's OAuth, userinfo and JWKS endpoints.
const GOOGLE_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let env = std::env::var("MEMBERHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting MemberHub"
    );

    // ── Database connection + migrations ─────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    memberhub_database::migration::run_migrations(db.pool()).await?;

    // ── Repositories ─────────────────────────────────────────────
    let session_repo = Arc::new(SessionRepository::new(db.pool().clone()));
    let backends = Backends {
        members: Arc::new(MemberRepository::new(db.pool().clone())),
        roles: Arc::new(RoleRepository::new(db.pool().clone())),
        sessions: session_repo.clone(),
        api_keys: Arc::new(ApiKeyRepository::new(db.pool().clone())),
    };

    // ── Google collaborators ─────────────────────────────────────
    let http = reqwest::Client::builder()
        .timeout(GOOGLE_HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
    let id_tokens = Arc::new(GoogleIdTokenVerifier::new(&config.auth, http.clone()));
    let oauth = Arc::new(GoogleOAuthClient::new(&config.auth, http));

    // ── Background activity writer ───────────────────────────────
    let (activity, activity_handle) =
        ActivityRecorder::spawn(session_repo, config.session.activity_queue_capacity);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cleanup_interval = config.session.cleanup_interval();
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(Arc::new(config), backends, activity, id_tokens, oauth);

    // ── Session cleanup ──────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = SessionCleanup::new(state.sessions.clone());
    let cleanup_handle = tokio::spawn(cleanup.run(cleanup_interval, shutdown_rx));

    // ── HTTP server ──────────────────────────────────────────────
    let app = memberhub_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "MemberHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Wait for background tasks ────────────────────────────────
    // The router held the last activity sender, so the writer drains and exits.
    let _ = tokio::time::timeout(shutdown_grace, cleanup_handle).await;
    let _ = tokio::time::timeout(shutdown_grace, activity_handle).await;

    db.close().await;
    tracing::info!("MemberHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
