//! Rust structs mapping to database tables.

use std::path::{Path, PathBuf};

use uuid::Uuid;
use vh_core::{ManifestSource, ResolutionTier, VideoId};

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

fn parse_opt_path(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<PathBuf>> {
    let s: Option<String> = row.get(idx)?;
    Ok(s.filter(|v| !v.is_empty()).map(PathBuf::from))
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// An uploaded video and the artifacts generated from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    /// Stored name of the uploaded source, relative to the media root.
    pub original_file: String,
    pub genre: String,
    /// RFC 3339 upload timestamp.
    pub upload_date: String,
    /// Stored name of the thumbnail image, relative to the media root.
    pub thumbnail: Option<String>,
    pub hls_480p_manifest: Option<PathBuf>,
    pub hls_720p_manifest: Option<PathBuf>,
    pub hls_1080p_manifest: Option<PathBuf>,
}

impl Video {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            original_file: row.get(3)?,
            genre: row.get(4)?,
            upload_date: row.get(5)?,
            thumbnail: row.get::<_, Option<String>>(6)?.filter(|t| !t.is_empty()),
            hls_480p_manifest: parse_opt_path(row, 7)?,
            hls_720p_manifest: parse_opt_path(row, 8)?,
            hls_1080p_manifest: parse_opt_path(row, 9)?,
        })
    }
}

impl ManifestSource for Video {
    fn hls_manifest(&self, tier: ResolutionTier) -> Option<&Path> {
        match tier {
            ResolutionTier::P480 => self.hls_480p_manifest.as_deref(),
            ResolutionTier::P720 => self.hls_720p_manifest.as_deref(),
            ResolutionTier::P1080 => self.hls_1080p_manifest.as_deref(),
        }
    }
}
