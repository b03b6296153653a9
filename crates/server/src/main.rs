use anyhow::Error as AnyhowError;
use db::DBService;
use server::{AppState, file_logging, routes};
use sqlx::Error as SqlxError;
use thiserror::Error;
use utils::assets::asset_dir;

#[derive(Debug, Error)]
pub enum BrainmintError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), BrainmintError> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    // The guard must be held for the lifetime of the application to ensure
    // logs are flushed
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    if !asset_dir().exists() {
        std::fs::create_dir_all(asset_dir())?;
    }

    let db = DBService::new().await?;
    let state = AppState::new(db);
    let app_router = routes::router(state.clone());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(8000);
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    perform_cleanup_actions(&state).await;

    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

pub async fn perform_cleanup_actions(state: &AppState) {
    // Run TRUNCATE checkpoint so all WAL content is written to the main
    // database before the process exits.
    tracing::info!("Running final WAL checkpoint...");
    match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(&state.db.pool)
        .await
    {
        Ok(_) => {
            tracing::info!("Final WAL checkpoint completed - all data flushed to main database")
        }
        Err(e) => tracing::warn!(
            "Final WAL checkpoint failed (data may still be in WAL): {}",
            e
        ),
    }

    tracing::info!("Closing database connection pool...");
    state.db.pool.close().await;
    tracing::info!("Database connection pool closed");
}
