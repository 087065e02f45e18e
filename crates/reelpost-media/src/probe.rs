//! FFprobe stream inspection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Codec, geometry and audio metadata of one candidate input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File that was probed
    pub path: PathBuf,
    /// Codec of the first video stream
    pub video_codec: Option<String>,
    /// Codec of the first audio stream
    pub audio_codec: Option<String>,
    /// Width in pixels (absent without a video stream)
    pub width: Option<u32>,
    /// Height in pixels (absent without a video stream)
    pub height: Option<u32>,
    /// Frame rate in fps
    pub frame_rate: Option<f64>,
    /// Whether an audio stream exists
    pub has_audio: bool,
}

/// Produces a [`MediaProbe`] for a file.
#[async_trait]
pub trait ProbeInspector: Send + Sync {
    async fn probe(&self, path: &Path) -> MediaResult<MediaProbe>;
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

/// [`ProbeInspector`] backed by the `ffprobe` binary.
#[derive(Debug, Clone, Default)]
pub struct FfprobeInspector;

impl FfprobeInspector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProbeInspector for FfprobeInspector {
    async fn probe(&self, path: &Path) -> MediaResult<MediaProbe> {
        if !path.exists() {
            return Err(MediaError::probe(path, "file not found"));
        }

        check_ffprobe()?;

        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MediaError::probe(
                path,
                if stderr.is_empty() {
                    format!("ffprobe exited with {}", output.status)
                } else {
                    stderr
                },
            ));
        }

        let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| MediaError::probe(path, format!("unreadable ffprobe output: {}", e)))?;

        let probe = probe_from_streams(path, &parsed.streams)?;
        debug!(
            path = %path.display(),
            video_codec = ?probe.video_codec,
            audio_codec = ?probe.audio_codec,
            width = ?probe.width,
            height = ?probe.height,
            frame_rate = ?probe.frame_rate,
            "Probed media"
        );
        Ok(probe)
    }
}

/// Build a probe from the first video and first audio stream.
fn probe_from_streams(path: &Path, streams: &[FfprobeStream]) -> MediaResult<MediaProbe> {
    if streams.is_empty() {
        return Err(MediaError::probe(path, "no decodable streams"));
    }

    let of_type = |kind: &str| {
        streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video = of_type("video");
    let audio = of_type("audio");

    Ok(MediaProbe {
        path: path.to_path_buf(),
        video_codec: video.and_then(|s| s.codec_name.clone()),
        audio_codec: audio.and_then(|s| s.codec_name.clone()),
        width: video.and_then(|s| s.width).filter(|w| *w > 0),
        height: video.and_then(|s| s.height).filter(|h| *h > 0),
        frame_rate: video
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
        has_audio: audio.is_some(),
    })
}

/// Parse a rational frame rate string (e.g., "30000/1001").
///
/// A zero denominator yields `None`.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let (num, den) = s.trim().split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}
