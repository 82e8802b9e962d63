//! HLS manifest and segment lookup.
//!
//! A video carries at most one generated playlist per [`ResolutionTier`].
//! [`resolve_manifest`] picks the playlist for a requested tier name and
//! [`resolve_segment`] maps a segment file name to a file next to that
//! playlist. Every miss is `None`: an unknown tier, a tier that has not been
//! transcoded yet, and a segment that is not on disk are all expected states.
//!
//! Nothing is cached; every call looks at the filesystem again.

use std::path::{Path, PathBuf};

use crate::media::ResolutionTier;

/// A record that may hold a generated HLS playlist for each tier.
pub trait ManifestSource {
    /// Filesystem path of the playlist generated for `tier`, if any.
    fn hls_manifest(&self, tier: ResolutionTier) -> Option<&Path>;
}

impl<T: ManifestSource + ?Sized> ManifestSource for &T {
    fn hls_manifest(&self, tier: ResolutionTier) -> Option<&Path> {
        (**self).hls_manifest(tier)
    }
}

/// Look up the playlist for a tier given by name (`"480p"`, `"720p"`,
/// `"1080p"`).
///
/// Returns `None` for an unrecognized tier name or when no playlist has been
/// recorded for the tier.
pub fn resolve_manifest<'a, S>(source: &'a S, resolution: &str) -> Option<&'a Path>
where
    S: ManifestSource + ?Sized,
{
    let tier = ResolutionTier::parse(resolution)?;
    source.hls_manifest(tier)
}

/// Locate a segment file that sits in the same directory as the tier's
/// playlist.
///
/// The returned path is `<playlist dir>/<segment_name>`. It is only returned
/// when a regular file exists there and, after resolving `..` components and
/// symlinks, that file is still inside the playlist directory. Names such as
/// `../../etc/passwd`, absolute paths, or symlinks pointing elsewhere resolve
/// to `None`.
pub fn resolve_segment<S>(source: &S, resolution: &str, segment_name: &str) -> Option<PathBuf>
where
    S: ManifestSource + ?Sized,
{
    let manifest = resolve_manifest(source, resolution)?;
    let dir = manifest.parent()?;
    let candidate = dir.join(segment_name);

    let canonical_dir = dir.canonicalize().ok()?;
    let canonical = candidate.canonicalize().ok()?;

    if canonical == canonical_dir || !canonical.starts_with(&canonical_dir) {
        tracing::warn!(
            segment = segment_name,
            dir = %dir.display(),
            "Rejected segment path outside manifest directory"
        );
        return None;
    }

    if !canonical.is_file() {
        return None;
    }

    Some(candidate)
}
