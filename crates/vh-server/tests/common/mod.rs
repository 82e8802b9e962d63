//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary media
//! root, and a full [`AppContext`]. [`TestHarness::serve`] starts Axum on a
//! random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vh_av::Encoder;
use vh_core::config::Config;
use vh_db::pool::{init_memory_pool, DbPool, PooledConnection};
use vh_server::context::AppContext;
use vh_server::router::build_router;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary media root.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    /// Kept alive for the lifetime of the harness.
    pub media_dir: TempDir,
}

impl TestHarness {
    /// Harness without an encoder; uploads are stored but never transcoded.
    pub fn new() -> Self {
        Self::with_encoder(None)
    }

    /// Harness whose uploads are transcoded by `encoder` when one is given.
    pub fn with_encoder(encoder: Option<Encoder>) -> Self {
        let media_dir = tempfile::tempdir().expect("failed to create media dir");
        let mut config = Config::default();
        config.media.root = media_dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize media dir");
        config.transcode.on_upload = encoder.is_some();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), config, encoder);

        Self { ctx, db, media_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Get a connection from the harness pool.
    pub fn conn(&self) -> PooledConnection {
        self.db.get().expect("failed to get connection")
    }

    /// Absolute media root.
    pub fn media_root(&self) -> &Path {
        &self.ctx.config.media.root
    }

    /// Write `contents` to `name` under the media root, creating parents.
    pub fn write_media(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.media_root().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Build a URL for `path` on the test server.
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// Write an executable `/bin/sh` stand-in for ffmpeg that creates its last
/// argument and a `000.ts` next to it.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    std::fs::write(
        &path,
        "#!/bin/sh\nfor last; do :; done\nprintf '#EXTM3U\\n' > \"$last\"\nprintf 'ts' > \"$(dirname \"$last\")/000.ts\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
