//! Core enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Type of timeline track.
///
/// The host identifies tracks by kind plus a 1-based index; `as_str`
/// yields the exact strings its track APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// The host-side name of this track kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_kind_matches_host_strings() {
        assert_eq!(TrackKind::Video.as_str(), "video");
        assert_eq!(TrackKind::Audio.as_str(), "audio");
        assert_eq!(TrackKind::Audio.to_string(), "audio");
    }
}
