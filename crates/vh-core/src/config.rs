//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, tool, media storage, and transcode sections. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::media::ResolutionTier;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tools: ToolsConfig,
    pub media: MediaConfig,
    pub transcode: TranscodeConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.max_upload_bytes == 0 {
            warnings.push("server.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if let Some(ref url) = self.server.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(format!(
                    "server.public_url '{url}' is not an absolute http(s) URL"
                ));
            }
        }

        if !self.media.url_prefix.starts_with('/') || !self.media.url_prefix.ends_with('/') {
            warnings.push(format!(
                "media.url_prefix '{}' should start and end with '/'",
                self.media.url_prefix
            ));
        }

        if self.transcode.on_upload && self.transcode.tiers.is_empty() {
            warnings.push("transcode.on_upload is enabled but transcode.tiers is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Absolute base (e.g. `https://videos.example.com`) used for thumbnail
    /// URLs. When unset, the request's `Host` header is used instead.
    pub public_url: Option<String>,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            db_path: PathBuf::from("data/vidhost.db"),
            public_url: None,
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// External tool path overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: Some(PathBuf::from("/usr/bin/ffmpeg")),
        }
    }
}

/// Where uploaded and generated media lives and how it is exposed by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub url_prefix: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            url_prefix: "/media/".into(),
        }
    }
}

impl MediaConfig {
    /// Filesystem path of a stored file name (relative to the media root).
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Site-relative URL of a stored file name.
    pub fn url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.url_prefix.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }
}

/// Transcoding performed after an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub on_upload: bool,
    pub tiers: Vec<ResolutionTier>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            on_upload: true,
            tiers: ResolutionTier::ALL.to_vec(),
        }
    }
}
