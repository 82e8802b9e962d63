//! HLS playlist and segment delivery.
//!
//! Files are only ever served from the directory of a playlist recorded for
//! the video; the name lookup goes through [`vh_core::resolve_segment`],
//! which refuses anything that escapes that directory.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use vh_av::encoder::HLS_PLAYLIST_NAME;
use vh_core::{resolve_manifest, resolve_segment, VideoId};

use crate::context::AppContext;
use crate::error::AppError;

const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// GET /api/videos/{id}/{resolution}/{file}
///
/// `index.m3u8` returns the tier's playlist; any other name is looked up as
/// a segment next to it.
#[utoipa::path(
    get,
    path = "/api/videos/{id}/{resolution}/{file}",
    params(
        ("id" = String, Path, description = "Video ID"),
        ("resolution" = String, Path, description = "480p, 720p or 1080p"),
        ("file" = String, Path, description = "index.m3u8 or a segment name"),
    ),
    responses(
        (status = 200, description = "Playlist or MPEG-TS segment"),
        (status = 404, description = "Unknown tier, no playlist, or no such segment")
    )
)]
pub async fn hls_file(
    State(ctx): State<AppContext>,
    Path((id, resolution, file)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let video_id: VideoId = id
        .parse()
        .map_err(|_| vh_core::Error::Validation("Invalid video_id".into()))?;

    let video = {
        let conn = vh_db::pool::get_conn(&ctx.db)?;
        vh_db::queries::videos::get_video(&conn, video_id)?
    }
    .ok_or_else(|| vh_core::Error::not_found("video", video_id))?;

    let (path, content_type) = if file == HLS_PLAYLIST_NAME {
        let playlist = resolve_manifest(&video, &resolution)
            .ok_or_else(|| vh_core::Error::not_found("playlist", format!("{id}/{resolution}")))?;
        (playlist.to_path_buf(), PLAYLIST_CONTENT_TYPE)
    } else {
        let segment = resolve_segment(&video, &resolution, &file)
            .ok_or_else(|| vh_core::Error::not_found("segment", format!("{id}/{resolution}/{file}")))?;
        (segment, SEGMENT_CONTENT_TYPE)
    };

    let data = match tokio::fs::read(&path).await {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(vh_core::Error::not_found("file", path.display()).into());
        }
        Err(e) => return Err(vh_core::Error::from(e).into()),
    };

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], data).into_response())
}
