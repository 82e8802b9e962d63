//! vh-server: HTTP API server for vidhost.
//!
//! This crate ties the other vh-* crates together into a running server:
//!
//! - Axum-based JSON API for listing, fetching, and uploading videos
//! - HLS playlist and segment delivery with directory-traversal hardening
//! - Background thumbnail and HLS generation after each upload
//! - Static serving of the media root and graceful shutdown on signals

pub mod context;
pub mod error;
pub mod router;
pub mod routes;
pub mod transcode;

use std::net::SocketAddr;

use vh_core::config::Config;

use crate::context::AppContext;

/// Start the vidhost server.
///
/// Initializes the database and media root, discovers ffmpeg, and serves
/// HTTP until a shutdown signal is received.
pub async fn start(mut config: Config) -> vh_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    let db = vh_db::pool::init_pool(db_path)?;
    if existed {
        tracing::info!("Database opened (existing) at {}", db_path.display());
    } else {
        tracing::info!("Database created (new) at {}", db_path.display());
    }

    // Playlist paths are stored as given, so anchor the media root.
    std::fs::create_dir_all(&config.media.root)?;
    config.media.root = std::fs::canonicalize(&config.media.root)?;
    tracing::info!("Media root at {}", config.media.root.display());

    // Discover ffmpeg.
    let tools = vh_av::ToolRegistry::discover(&config.tools);
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}", info.name);
        }
    }
    let encoder = match vh_av::Encoder::from_registry(&tools) {
        Ok(enc) => Some(enc),
        Err(e) => {
            tracing::warn!("Uploads will not be transcoded: {e}");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| vh_core::Error::Validation(format!("Invalid listen address: {e}")))?;

    let ctx = AppContext::new(db, config, encoder);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
