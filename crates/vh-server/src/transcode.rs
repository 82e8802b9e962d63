//! Background artifact generation for freshly uploaded videos.
//!
//! After an upload is stored, a task extracts the thumbnail and then
//! segments the source into HLS for each configured tier, recording every
//! artifact as soon as it exists. ffmpeg calls block, so the whole job runs
//! on the blocking pool. A failed step stops the job and is logged; there
//! are no retries.

use tokio::task::JoinHandle;

use vh_av::Encoder;
use vh_core::config::MediaConfig;
use vh_core::{ResolutionTier, Result, VideoId};
use vh_db::models::Video;
use vh_db::pool::{get_conn, DbPool};
use vh_db::queries::videos;

use crate::context::AppContext;

/// Stored name (relative to the media root) of a video's thumbnail.
pub fn thumbnail_name(id: VideoId) -> String {
    format!("thumbnails/{id}.jpg")
}

/// Stored name of the directory holding every HLS tier of a video.
pub fn video_dir_name(id: VideoId) -> String {
    format!("videos/{id}")
}

/// Stored name of the HLS output directory for one tier.
pub fn hls_dir_name(id: VideoId, tier: ResolutionTier) -> String {
    format!("{}/{tier}", video_dir_name(id))
}

/// Spawn the transcode job for `video`.
///
/// Returns `None` without doing anything when no encoder is configured.
pub fn spawn_transcode(ctx: &AppContext, video: Video) -> Option<JoinHandle<()>> {
    let Some(encoder) = ctx.encoder.clone() else {
        tracing::warn!(video_id = %video.id, "No ffmpeg available; skipping transcode");
        return None;
    };
    let db = ctx.db.clone();
    let config = ctx.config.clone();

    Some(tokio::spawn(async move {
        let video_id = video.id;
        let result = tokio::task::spawn_blocking(move || {
            transcode_video(&encoder, &db, &config.media, &config.transcode.tiers, &video)
        })
        .await;

        match result {
            Ok(Ok(())) => tracing::info!(video_id = %video_id, "Transcode finished"),
            Ok(Err(e)) => tracing::error!(video_id = %video_id, error = %e, "Transcode failed"),
            Err(e) => tracing::error!(video_id = %video_id, error = %e, "Transcode task panicked"),
        }
    }))
}

/// Generate the thumbnail and one HLS rendition per tier for `video`.
///
/// Blocks until every ffmpeg run has finished. Each artifact is written to
/// the database right after it is produced, so a later failure leaves the
/// earlier ones usable.
pub fn transcode_video(
    encoder: &Encoder,
    db: &DbPool,
    media: &MediaConfig,
    tiers: &[ResolutionTier],
    video: &Video,
) -> Result<()> {
    let source = media.path(&video.original_file);

    let thumb_name = thumbnail_name(video.id);
    let thumb_path = media.path(&thumb_name);
    if let Some(parent) = thumb_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    encoder.extract_thumbnail(&source, &thumb_path)?;
    let conn = get_conn(db)?;
    videos::set_thumbnail(&conn, video.id, Some(&thumb_name))?;
    drop(conn);

    for &tier in tiers {
        let out_dir = media.path(&hls_dir_name(video.id, tier));
        let playlist = encoder.scale_and_segment(&source, &out_dir, tier.height())?;
        let conn = get_conn(db)?;
        videos::set_hls_manifest(&conn, video.id, tier, Some(&playlist))?;
        tracing::debug!(video_id = %video.id, tier = %tier, "HLS rendition recorded");
    }

    Ok(())
}
