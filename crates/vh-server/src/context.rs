//! Application context shared by all route handlers via Axum state.

use std::sync::Arc;

use vh_av::Encoder;
use vh_core::config::Config;
use vh_db::pool::DbPool;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// ffmpeg runner used for upload transcoding. `None` when no binary was
    /// found at startup; uploads are then stored without derived artifacts.
    pub encoder: Option<Arc<Encoder>>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config, encoder: Option<Encoder>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            encoder: encoder.map(Arc::new),
        }
    }
}
