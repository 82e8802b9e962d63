//! Media-domain enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ResolutionTier
// ---------------------------------------------------------------------------

/// Target output resolution for transcoding and HLS delivery.
///
/// The set is closed: each tier owns exactly one manifest slot on a video, so
/// adding a tier means extending every exhaustive match over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionTier {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl ResolutionTier {
    /// Every tier, lowest first.
    pub const ALL: [ResolutionTier; 3] = [Self::P480, Self::P720, Self::P1080];

    /// Output pixel height; the width is derived by the encoder.
    pub fn height(self) -> u32 {
        match self {
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// Wire and directory name, e.g. `"720p"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }

    /// Parse a tier name, returning `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "480p" => Some(Self::P480),
            "720p" => Some(Self::P720),
            "1080p" => Some(Self::P1080),
            _ => None,
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionTier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::Error::Validation(format!(
                "unknown resolution '{s}' (expected 480p, 720p or 1080p)"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights() {
        assert_eq!(ResolutionTier::P480.height(), 480);
        assert_eq!(ResolutionTier::P720.height(), 720);
        assert_eq!(ResolutionTier::P1080.height(), 1080);
    }

    #[test]
    fn parse_accepts_only_known_tiers() {
        for tier in ResolutionTier::ALL {
            assert_eq!(ResolutionTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(ResolutionTier::parse("360p"), None);
        assert_eq!(ResolutionTier::parse("720"), None);
        assert_eq!(ResolutionTier::parse("720P"), None);
        assert_eq!(ResolutionTier::parse(""), None);
    }

    #[test]
    fn from_str_reports_validation_error() {
        let err = "4k".parse::<ResolutionTier>().unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ResolutionTier::P1080).unwrap();
        assert_eq!(json, "\"1080p\"");
        let back: ResolutionTier = serde_json::from_str("\"480p\"").unwrap();
        assert_eq!(back, ResolutionTier::P480);
    }
}
