//! Video listing, detail, and upload route handlers.
//!
//! The response types here are the API's presentation layer: they turn a
//! stored [`Video`] into the list and upload shapes clients consume.

use std::path::PathBuf;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use vh_core::config::{Config, MediaConfig};
use vh_core::{slugify, VideoId};
use vh_db::models::Video;

use crate::context::AppContext;
use crate::error::AppError;
use crate::transcode;

/// Directory (relative to the media root) that holds uploaded sources.
const ORIGINALS_DIR: &str = "videos/originals";

/// Video as shown in listings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoListResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub description: String,
    /// Absolute URL of the thumbnail, or `null` when none is stored or the
    /// file is missing on disk.
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub slug: String,
}

impl VideoListResponse {
    pub fn from_model(video: &Video, media: &MediaConfig, origin: Option<&str>) -> Self {
        Self {
            id: video.id.to_string(),
            created_at: video.upload_date.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            thumbnail_url: thumbnail_url(video, media, origin),
            category: video.genre.clone(),
            slug: slugify(&video.title),
        }
    }
}

/// Video as echoed back after an upload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoUploadResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    /// URL of the stored source file.
    pub original_file: String,
    pub genre: String,
}

impl VideoUploadResponse {
    pub fn from_model(video: &Video, media: &MediaConfig, origin: Option<&str>) -> Self {
        Self {
            id: video.id.to_string(),
            title: video.title.clone(),
            description: video.description.clone(),
            original_file: absolute_url(media, &video.original_file, origin),
            genre: video.genre.clone(),
        }
    }
}

/// Multipart form accepted by `POST /api/videos` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadVideoForm {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub original_file: Vec<u8>,
}

/// URL of the video's thumbnail.
///
/// `None` when no thumbnail is stored or the stored file no longer exists.
/// With an `origin` the URL is absolute; otherwise it is site-relative.
pub fn thumbnail_url(video: &Video, media: &MediaConfig, origin: Option<&str>) -> Option<String> {
    let name = video.thumbnail.as_deref()?;
    if !media.path(name).is_file() {
        tracing::debug!("Thumbnail {name} for video {} is missing on disk", video.id);
        return None;
    }
    Some(absolute_url(media, name, origin))
}

fn absolute_url(media: &MediaConfig, name: &str, origin: Option<&str>) -> String {
    let url = media.url(name);
    match origin {
        Some(origin) => format!("{}{url}", origin.trim_end_matches('/')),
        None => url,
    }
}

/// Scheme and authority that absolute URLs in responses should use.
///
/// `server.public_url` wins; otherwise the request's `Host` header is used.
/// Without either, URLs stay site-relative.
pub fn request_origin(config: &Config, headers: &HeaderMap) -> Option<String> {
    if let Some(ref url) = config.server.public_url {
        return Some(url.trim_end_matches('/').to_string());
    }

    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{scheme}://{host}"))
}

/// GET /api/videos
#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "All videos, newest first", body = Vec<VideoListResponse>)
    )
)]
pub async fn list_videos(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<Vec<VideoListResponse>>, AppError> {
    let conn = vh_db::pool::get_conn(&ctx.db)?;
    let videos = vh_db::queries::videos::list_videos(&conn)?;

    let origin = request_origin(&ctx.config, &headers);
    let items = videos
        .iter()
        .map(|v| VideoListResponse::from_model(v, &ctx.config.media, origin.as_deref()))
        .collect();
    Ok(Json(items))
}

/// GET /api/videos/{id}
#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoListResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<VideoListResponse>, AppError> {
    let video_id: VideoId = id
        .parse()
        .map_err(|_| vh_core::Error::Validation("Invalid video_id".into()))?;

    let conn = vh_db::pool::get_conn(&ctx.db)?;
    let video = vh_db::queries::videos::get_video(&conn, video_id)?
        .ok_or_else(|| vh_core::Error::not_found("video", video_id))?;

    let origin = request_origin(&ctx.config, &headers);
    Ok(Json(VideoListResponse::from_model(
        &video,
        &ctx.config.media,
        origin.as_deref(),
    )))
}

/// Source file written to disk while the upload form is read.
struct StoredUpload {
    /// Name relative to the media root.
    name: String,
    path: PathBuf,
    bytes: u64,
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadFields {
    title: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    file: Option<StoredUpload>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> vh_core::Error {
    vh_core::Error::Validation(format!("Invalid multipart body: {e}"))
}

/// Remove a file or directory tree, ignoring paths that are already gone.
async fn remove_path(path: &std::path::Path) {
    let result = if path.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
    }
}

/// Append every chunk of `field` to `file`, returning the byte count.
async fn copy_chunks(mut field: Field<'_>, file: &mut tokio::fs::File) -> vh_core::Result<u64> {
    let mut bytes = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(bytes)
}

/// Stream a file field to a fresh name under [`ORIGINALS_DIR`].
///
/// The body is written chunk by chunk, so an upload is never held in memory
/// as a whole. A partially written file is removed on failure.
async fn store_file_field(field: Field<'_>, media: &MediaConfig) -> vh_core::Result<StoredUpload> {
    let name = stored_original_name(field.file_name());
    let path = media.path(&name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(&path).await?;
    match copy_chunks(field, &mut file).await {
        Ok(bytes) => Ok(StoredUpload { name, path, bytes }),
        Err(e) => {
            drop(file);
            remove_path(&path).await;
            Err(e)
        }
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    media: &MediaConfig,
    fields: &mut UploadFields,
) -> vh_core::Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => fields.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => {
                fields.description = Some(field.text().await.map_err(multipart_error)?)
            }
            "genre" => fields.genre = Some(field.text().await.map_err(multipart_error)?),
            "original_file" => {
                let stored = store_file_field(field, media).await?;
                if let Some(previous) = fields.file.replace(stored) {
                    remove_path(&previous.path).await;
                }
            }
            other => tracing::debug!("Ignoring unknown upload field {other:?}"),
        }
    }
    Ok(())
}

/// Read the whole form, streaming the file field to disk.
///
/// On error nothing stays behind on disk.
async fn read_upload(mut multipart: Multipart, media: &MediaConfig) -> vh_core::Result<UploadFields> {
    let mut fields = UploadFields::default();
    if let Err(e) = read_fields(&mut multipart, media, &mut fields).await {
        if let Some(file) = fields.file.take() {
            remove_path(&file.path).await;
        }
        return Err(e);
    }
    Ok(fields)
}

/// Stored name for an uploaded source, keeping a sanitized extension from
/// the client's file name.
fn stored_original_name(client_name: Option<&str>) -> String {
    let ext = client_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    let stem = uuid::Uuid::new_v4().simple().to_string();
    match ext {
        Some(ext) => format!("{ORIGINALS_DIR}/{stem}.{ext}"),
        None => format!("{ORIGINALS_DIR}/{stem}"),
    }
}

/// POST /api/videos
#[utoipa::path(
    post,
    path = "/api/videos",
    request_body(content = UploadVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video stored", body = VideoUploadResponse),
        (status = 400, description = "Missing title or file")
    )
)]
pub async fn upload_video(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<VideoUploadResponse>), AppError> {
    let media = &ctx.config.media;
    let UploadFields {
        title,
        description,
        genre,
        file,
    } = read_upload(multipart, media).await?;

    let file =
        file.ok_or_else(|| vh_core::Error::Validation("original_file is required".into()))?;
    let rejection = match title.as_deref().map(str::trim) {
        None | Some("") => Some("title is required"),
        Some(_) if file.bytes == 0 => Some("original_file is empty"),
        Some(_) => None,
    };
    if let Some(message) = rejection {
        remove_path(&file.path).await;
        return Err(vh_core::Error::Validation(message.into()).into());
    }
    let title = title.unwrap_or_default().trim().to_string();
    let description = description.unwrap_or_default();
    let genre = genre.unwrap_or_default();

    let created = vh_db::pool::get_conn(&ctx.db).and_then(|conn| {
        vh_db::queries::videos::create_video(&conn, &title, &description, &file.name, &genre)
    });
    let video = match created {
        Ok(v) => v,
        Err(e) => {
            remove_path(&file.path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = %video.id,
        bytes = file.bytes,
        "Stored upload {:?} as {}",
        title,
        file.name
    );

    if ctx.config.transcode.on_upload {
        transcode::spawn_transcode(&ctx, video.clone());
    }

    let origin = request_origin(&ctx.config, &headers);
    Ok((
        StatusCode::CREATED,
        Json(VideoUploadResponse::from_model(
            &video,
            media,
            origin.as_deref(),
        )),
    ))
}

/// DELETE /api/videos/{id}
///
/// Removes the row, then the source file, the thumbnail and every HLS tier.
/// Media removal is best-effort; failures are logged.
#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video and its media removed"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let video_id: VideoId = id
        .parse()
        .map_err(|_| vh_core::Error::Validation("Invalid video_id".into()))?;

    let video = {
        let conn = vh_db::pool::get_conn(&ctx.db)?;
        let video = vh_db::queries::videos::get_video(&conn, video_id)?
            .ok_or_else(|| vh_core::Error::not_found("video", video_id))?;
        vh_db::queries::videos::delete_video(&conn, video_id)?;
        video
    };

    let media = &ctx.config.media;
    remove_path(&media.path(&video.original_file)).await;
    if let Some(ref thumbnail) = video.thumbnail {
        remove_path(&media.path(thumbnail)).await;
    }
    remove_path(&media.path(&transcode::video_dir_name(video_id))).await;

    tracing::info!(video_id = %video_id, "Deleted video {:?}", video.title);
    Ok(StatusCode::NO_CONTENT)
}
