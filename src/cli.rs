use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidhost")]
#[command(author, version, about = "Video hosting backend with ffmpeg transcoding and HLS delivery")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Re-encode a video to a single MP4 at the given height
    Encode {
        /// Source video
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Target height in pixels; width follows the aspect ratio
        #[arg(long, default_value_t = 720)]
        height: u32,
    },

    /// Re-encode a video into HLS segments plus an index.m3u8 playlist
    Segment {
        /// Source video
        input: PathBuf,

        /// Directory that receives the playlist and segments
        output_dir: PathBuf,

        /// Target height in pixels; width follows the aspect ratio
        #[arg(long, default_value_t = 720)]
        height: u32,
    },

    /// Grab a 272x154 frame one second into a video
    Thumbnail {
        /// Source video
        input: PathBuf,

        /// Output image
        output: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_segment_with_height() {
        let cli = Cli::parse_from(["vidhost", "segment", "in.mp4", "out/720p", "--height", "480"]);
        match cli.command {
            Commands::Segment {
                input,
                output_dir,
                height,
            } => {
                assert_eq!(input, PathBuf::from("in.mp4"));
                assert_eq!(output_dir, PathBuf::from("out/720p"));
                assert_eq!(height, 480);
            }
            _ => panic!("expected segment"),
        }
    }

    #[test]
    fn start_overrides_are_optional() {
        let cli = Cli::parse_from(["vidhost", "-c", "vidhost.json", "start"]);
        assert_eq!(cli.config, Some(PathBuf::from("vidhost.json")));
        match cli.command {
            Commands::Start { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, None);
            }
            _ => panic!("expected start"),
        }
    }
}
