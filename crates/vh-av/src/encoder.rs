//! Resolution-scaled encoding, HLS segmentation, and thumbnail extraction.
//!
//! Each operation runs ffmpeg exactly once with a fixed argument vector and
//! blocks until it exits. A non-zero exit becomes [`vh_core::Error::Tool`]
//! carrying the captured stderr. There are no retries.
//!
//! Precondition: callers must serialize operations that target the same
//! output path. Two concurrent encodes writing the same file race on disk.

use std::path::{Path, PathBuf};

use crate::command::{ToolCommand, ToolOutput};
use crate::tools::ToolRegistry;

/// Video codec for every encode.
pub const VIDEO_CODEC: &str = "libx264";
/// Constant rate factor (quality level) passed to the video codec.
pub const VIDEO_CRF: u32 = 23;
/// x264 speed/quality preset.
pub const VIDEO_PRESET: &str = "fast";
/// Audio codec for every encode.
pub const AUDIO_CODEC: &str = "aac";
/// Container flags for progressive MP4 output (moov atom up front).
pub const MOVFLAGS: &str = "+faststart";

/// Target duration of each HLS segment, in seconds.
pub const HLS_SEGMENT_SECONDS: u32 = 10;
/// `-hls_list_size` value; zero keeps every segment in the playlist.
pub const HLS_LIST_SIZE: u32 = 0;
/// File name of the generated playlist inside the output directory.
pub const HLS_PLAYLIST_NAME: &str = "index.m3u8";
/// ffmpeg pattern for segment file names (`000.ts`, `001.ts`, ...).
pub const HLS_SEGMENT_PATTERN: &str = "%03d.ts";

/// Timestamp of the frame captured as thumbnail.
pub const THUMBNAIL_OFFSET: &str = "00:00:01";
/// Thumbnail width in pixels.
pub const THUMBNAIL_WIDTH: u32 = 272;
/// Thumbnail height in pixels.
pub const THUMBNAIL_HEIGHT: u32 = 154;

const TOOL_NAME: &str = "ffmpeg";

/// Runs encoder operations against a specific ffmpeg binary.
///
/// The binary path is supplied at construction so tests (and deployments with
/// a non-standard layout) can substitute their own executable.
#[derive(Debug, Clone)]
pub struct Encoder {
    ffmpeg: PathBuf,
}

impl Encoder {
    /// Use the ffmpeg binary at `ffmpeg`.
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Use the ffmpeg binary found by tool discovery.
    pub fn from_registry(tools: &ToolRegistry) -> vh_core::Result<Self> {
        Ok(Self::new(tools.require(TOOL_NAME)?.path.clone()))
    }

    /// Path of the binary this encoder runs.
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    /// Re-encode `input` to a single file at `output`, scaled to `height`
    /// pixels with the width following the aspect ratio (rounded to even).
    pub fn scale_and_encode(&self, input: &Path, output: &Path, height: u32) -> vh_core::Result<()> {
        tracing::info!(
            "Encode: {:?} -> {:?} (height={})",
            input,
            output,
            height
        );

        let cmd = self.scale_and_encode_command(input, output, height);
        self.run(&cmd, "encode")?;

        tracing::debug!("Encoded {}", output.display());
        Ok(())
    }

    /// Re-encode `input` into HLS segments under `output_dir`, scaled to
    /// `height` pixels.
    ///
    /// Writes `HLS_PLAYLIST_NAME` and `HLS_SEGMENT_PATTERN` files into
    /// `output_dir` (created if missing) and returns the playlist path.
    pub fn scale_and_segment(
        &self,
        input: &Path,
        output_dir: &Path,
        height: u32,
    ) -> vh_core::Result<PathBuf> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            vh_core::Error::Internal(format!(
                "Failed to create HLS output dir {}: {e}",
                output_dir.display()
            ))
        })?;

        let playlist = output_dir.join(HLS_PLAYLIST_NAME);

        tracing::info!(
            "HLS encode: {:?} -> {:?} (height={}, segment_duration={}s)",
            input,
            output_dir,
            height,
            HLS_SEGMENT_SECONDS
        );

        let cmd = self.scale_and_segment_command(input, output_dir, height);
        self.run(&cmd, "hls")?;

        tracing::debug!("HLS playlist written to {}", playlist.display());
        Ok(playlist)
    }

    /// Grab the frame at `THUMBNAIL_OFFSET` from `input`, scale it to
    /// `THUMBNAIL_WIDTH`x`THUMBNAIL_HEIGHT`, and write it to `output`,
    /// overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Besides a failed ffmpeg run, returns [`vh_core::Error::MissingOutput`]
    /// when ffmpeg exits successfully but `output` does not exist afterwards.
    pub fn extract_thumbnail(&self, input: &Path, output: &Path) -> vh_core::Result<()> {
        tracing::info!("Thumbnail: {:?} -> {:?}", input, output);

        let cmd = self.thumbnail_command(input, output);
        self.run(&cmd, "thumbnail")?;

        if !output.exists() {
            tracing::error!(
                "Thumbnail step reported success but {} is missing",
                output.display()
            );
            return Err(vh_core::Error::missing_output(TOOL_NAME, output));
        }

        tracing::debug!("Thumbnail written to {}", output.display());
        Ok(())
    }

    /// Run `cmd`, logging the tool's stderr when it fails.
    fn run(&self, cmd: &ToolCommand, step: &str) -> vh_core::Result<ToolOutput> {
        cmd.execute().map_err(|e| {
            tracing::error!(step = step, error = %e, "ffmpeg invocation failed");
            e
        })
    }

    fn scale_and_encode_command(&self, input: &Path, output: &Path, height: u32) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-i");
        cmd.arg(input.to_string_lossy().as_ref());
        push_video_audio_args(&mut cmd, height);
        cmd.args(["-movflags", MOVFLAGS]);
        cmd.arg(output.to_string_lossy().as_ref());
        cmd
    }

    fn scale_and_segment_command(&self, input: &Path, output_dir: &Path, height: u32) -> ToolCommand {
        let seg_pattern = output_dir.join(HLS_SEGMENT_PATTERN);
        let playlist = output_dir.join(HLS_PLAYLIST_NAME);

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-i");
        cmd.arg(input.to_string_lossy().as_ref());
        push_video_audio_args(&mut cmd, height);
        cmd.args(["-hls_time", &HLS_SEGMENT_SECONDS.to_string()]);
        cmd.args(["-hls_list_size", &HLS_LIST_SIZE.to_string()]);
        cmd.args(["-hls_segment_filename", &seg_pattern.to_string_lossy()]);
        cmd.arg(playlist.to_string_lossy().as_ref());
        cmd
    }

    fn thumbnail_command(&self, input: &Path, output: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-i");
        cmd.arg(input.to_string_lossy().as_ref());
        cmd.args(["-ss", THUMBNAIL_OFFSET]);
        cmd.args(["-vframes", "1"]);
        cmd.args([
            "-vf".to_string(),
            format!("scale={THUMBNAIL_WIDTH}:{THUMBNAIL_HEIGHT}"),
        ]);
        cmd.arg("-y");
        cmd.arg(output.to_string_lossy().as_ref());
        cmd
    }
}

/// Shared scaling, video, and audio arguments for both encode operations.
fn push_video_audio_args(cmd: &mut ToolCommand, height: u32) {
    cmd.args(["-vf".to_string(), format!("scale=-2:{height}")]);
    cmd.args(["-c:v", VIDEO_CODEC]);
    cmd.args(["-crf".to_string(), VIDEO_CRF.to_string()]);
    cmd.args(["-preset", VIDEO_PRESET]);
    cmd.args(["-c:a", AUDIO_CODEC]);
}
