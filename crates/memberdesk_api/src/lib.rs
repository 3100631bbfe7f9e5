//! HTTP surface for MemberDesk.
//!
//! # Responsibility
//! - Map HTTP requests onto core services, one service call per request.
//! - Translate service errors into status codes and JSON error bodies.
//! - Own server configuration and startup.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{CliArgs, ServerConfig};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

use anyhow::Context;
use log::{info, warn};
use memberdesk_core::Database;

/// Opens the database, binds the listener and serves until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let db = Database::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    let app = build_router(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=api status=ok bind={} db_path={}",
        config.bind,
        config.db_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=api status=error error={err}");
        std::future::pending::<()>().await;
    }
}
