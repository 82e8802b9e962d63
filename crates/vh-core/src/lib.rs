//! vh-core: shared types, IDs, errors, configuration, and manifest lookup.
//!
//! This crate is the foundational dependency for all other vh-* crates. It
//! owns the unified error type, the closed set of resolution tiers, the
//! application configuration, slug derivation, and the manifest resolver that
//! maps a video and a tier to HLS files on disk.

pub mod config;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod media;
pub mod slug;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use manifest::{resolve_manifest, resolve_segment, ManifestSource};
pub use media::*;
pub use slug::slugify;
