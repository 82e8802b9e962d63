//! # vh-av
//!
//! External encoder invocation for vidhost.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find the ffmpeg binary from the
//!   configured path or `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- synchronous builder that runs
//!   an external process and captures its output.
//! - **Encoder operations** ([`Encoder`]) -- resolution-scaled encode, HLS
//!   segmentation, and thumbnail extraction with fixed argument vectors.
//!
//! Every operation blocks the calling thread until the external process
//! exits. Async callers should wrap calls in `tokio::task::spawn_blocking`.

pub mod command;
pub mod encoder;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use encoder::Encoder;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
