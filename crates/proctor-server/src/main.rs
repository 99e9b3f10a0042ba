//! # proctor-server
//!
//! HTTP service for university exam scheduling and study recommendations.
//!
//! This binary provides:
//! - **Exam scheduling** for admins, with a room conflict gate and
//!   drag-to-reschedule on a 30 minute slot grid
//! - **Student schedules**: exams grouped by day with conflict flags, a live
//!   next-exam countdown over SSE, and iCal export
//! - **Enrollment, learning preferences and study recommendations**
//! - **Catalog** management for courses, rooms and study resources
//!
//! Authentication is delegated to an identity gateway in front of the
//! service; see [`auth`].

mod api;
mod auth;
mod config;
mod error;
mod services;

use proctor_store::seed::seed_demo_data;
use proctor_store::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,proctor_server=debug")),
        )
        .init();

    info!("Starting proctor server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        http_addr = %config.http_addr,
        schedule_offset = %config.schedule_offset,
        gateway_secret = config.gateway_secret.is_some(),
        bootstrap_admins = config.bootstrap_admin_emails.len(),
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Open the database (runs pending migrations)
    // -----------------------------------------------------------------------
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::open_default()?,
    };
    if let Some(path) = db.path() {
        info!(path = %path.display(), "Database ready");
    }

    if config.seed_demo_data {
        let report = seed_demo_data(&db)?;
        info!(inserted = report.total(), ?report, "Demo data seeded");
    }

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    let app_state = AppState::new(db, config);

    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
