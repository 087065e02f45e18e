//! Media items handed to the publishing flows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media referenced by a public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Whether the remote platform processes this kind asynchronously.
    pub fn needs_processing(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One publicly reachable media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Public (usually presigned) URL the platform fetches from
    pub url: String,
    /// Media kind
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Image,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_serde() {
        let item = MediaItem::video("https://cdn.example.com/a.mp4");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"kind\":\"video\""));
    }

    #[test]
    fn test_needs_processing() {
        assert!(MediaKind::Video.needs_processing());
        assert!(!MediaKind::Image.needs_processing());
    }
}
