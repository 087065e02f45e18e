//! Reel encoding profile.

use serde::{Deserialize, Serialize};

/// Canonical vertical frame width
pub const REEL_WIDTH: u32 = 1080;
/// Canonical vertical frame height
pub const REEL_HEIGHT: u32 = 1920;
/// Output frame rate
pub const REEL_FPS: u32 = 30;
/// Default reel duration in seconds
pub const DEFAULT_REEL_DURATION_SECS: u32 = 12;
/// Default margin around the poster inside the frame
pub const DEFAULT_REEL_MARGIN: u32 = 24;

/// Zoom increment applied per frame
pub const ZOOM_STEP: f64 = 0.0015;
/// Maximum zoom factor
pub const ZOOM_MAX: f64 = 1.12;

/// Video encoding settings shared by every encode
pub const VIDEO_CODEC: &str = "libx264";
pub const VIDEO_PRESET: &str = "veryfast";
pub const VIDEO_PROFILE: &str = "high";
pub const VIDEO_BITRATE: &str = "5000k";
pub const PIXEL_FORMAT: &str = "yuv420p";

/// Audio settings
pub const AUDIO_CODEC: &str = "aac";
pub const NARRATION_BITRATE: &str = "128k";
pub const SILENT_BITRATE: &str = "64k";
pub const SILENT_SOURCE: &str = "anullsrc=r=48000:cl=stereo";
pub const SILENT_VOLUME: f64 = 0.02;

/// Per-run reel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSettings {
    /// Frame width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Frame height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Margin kept free on every side of the scaled image
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// Output duration in seconds
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_width() -> u32 {
    REEL_WIDTH
}
fn default_height() -> u32 {
    REEL_HEIGHT
}
fn default_margin() -> u32 {
    DEFAULT_REEL_MARGIN
}
fn default_duration() -> u32 {
    DEFAULT_REEL_DURATION_SECS
}
fn default_fps() -> u32 {
    REEL_FPS
}

impl Default for ReelSettings {
    fn default() -> Self {
        Self {
            width: REEL_WIDTH,
            height: REEL_HEIGHT,
            margin: DEFAULT_REEL_MARGIN,
            duration_secs: DEFAULT_REEL_DURATION_SECS,
            fps: REEL_FPS,
        }
    }
}

impl ReelSettings {
    /// Returns settings with a different duration.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Returns settings with a different margin.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Box the image is scaled into, after removing the margin on each side.
    ///
    /// Never smaller than 2x2 so a huge margin cannot produce an invalid scale.
    pub fn inner_box(&self) -> (u32, u32) {
        let both_sides = self.margin.saturating_mul(2);
        let w = self.width.saturating_sub(both_sides).max(2);
        let h = self.height.saturating_sub(both_sides).max(2);
        (w, h)
    }

    /// Frame size as `WxH`.
    pub fn frame_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
