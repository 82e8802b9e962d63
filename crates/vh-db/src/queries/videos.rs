//! Video CRUD operations.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use vh_core::{Error, ResolutionTier, Result, VideoId};

use crate::models::Video;

const COLS: &str = "id, title, description, original_file, genre, upload_date, thumbnail, \
                    hls_480p_manifest, hls_720p_manifest, hls_1080p_manifest";

/// Column that stores the playlist for `tier`.
fn manifest_column(tier: ResolutionTier) -> &'static str {
    match tier {
        ResolutionTier::P480 => "hls_480p_manifest",
        ResolutionTier::P720 => "hls_720p_manifest",
        ResolutionTier::P1080 => "hls_1080p_manifest",
    }
}

/// Create a new video record with no thumbnail and no manifests.
pub fn create_video(
    conn: &Connection,
    title: &str,
    description: &str,
    original_file: &str,
    genre: &str,
) -> Result<Video> {
    let id = VideoId::new();
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO videos (id, title, description, original_file, genre, upload_date)
         VALUES (?1,?2,?3,?4,?5,?6)",
        rusqlite::params![id.to_string(), title, description, original_file, genre, &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Video {
        id,
        title: title.to_string(),
        description: description.to_string(),
        original_file: original_file.to_string(),
        genre: genre.to_string(),
        upload_date: now,
        thumbnail: None,
        hls_480p_manifest: None,
        hls_720p_manifest: None,
        hls_1080p_manifest: None,
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<Video>> {
    let q = format!("SELECT {COLS} FROM videos WHERE id = ?1");
    let result = conn.query_row(&q, [id.to_string()], Video::from_row);
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all videos, newest upload first.
pub fn list_videos(conn: &Connection) -> Result<Vec<Video>> {
    let q = format!("SELECT {COLS} FROM videos ORDER BY upload_date DESC, rowid DESC");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Video::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Set or clear the stored thumbnail name. Returns `false` if the video does
/// not exist.
pub fn set_thumbnail(conn: &Connection, id: VideoId, thumbnail: Option<&str>) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE videos SET thumbnail = ?1 WHERE id = ?2",
            rusqlite::params![thumbnail, id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Set or clear the playlist path for one tier. Returns `false` if the video
/// does not exist.
pub fn set_hls_manifest(
    conn: &Connection,
    id: VideoId,
    tier: ResolutionTier,
    playlist: Option<&Path>,
) -> Result<bool> {
    let q = format!("UPDATE videos SET {} = ?1 WHERE id = ?2", manifest_column(tier));
    let playlist = playlist.map(|p| p.to_string_lossy().to_string());
    let n = conn
        .execute(&q, rusqlite::params![playlist, id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a video by ID.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM videos WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
