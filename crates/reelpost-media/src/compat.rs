//! Stream-copy compatibility classification.
//!
//! Decides from probe metadata alone whether a set of clips can be spliced at
//! the container level. Pure: no I/O, deterministic for a given probe order.

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};
use crate::probe::MediaProbe;

/// Maximum frame rate difference still treated as equal.
pub const FRAME_RATE_TOLERANCE: f64 = 0.01;

/// Outcome of comparing every probe against the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityVerdict {
    pub same_video_codec: bool,
    pub same_audio_presence: bool,
    /// Always true when the reference has no audio
    pub same_audio_codec: bool,
    pub same_dimensions: bool,
    pub same_frame_rate: bool,
}

impl CompatibilityVerdict {
    /// Whether the inputs can be concatenated without re-encoding.
    pub fn is_compatible(&self) -> bool {
        self.same_video_codec
            && self.same_audio_presence
            && self.same_audio_codec
            && self.same_dimensions
            && self.same_frame_rate
    }
}

/// Classify a non-empty probe sequence; the first probe is the reference.
pub fn classify(probes: &[MediaProbe]) -> MediaResult<CompatibilityVerdict> {
    let (reference, rest) = probes
        .split_first()
        .ok_or_else(|| MediaError::invalid_input("cannot classify an empty probe list"))?;

    Ok(CompatibilityVerdict {
        same_video_codec: rest.iter().all(|p| p.video_codec == reference.video_codec),
        same_audio_presence: rest.iter().all(|p| p.has_audio == reference.has_audio),
        same_audio_codec: !reference.has_audio
            || rest.iter().all(|p| p.audio_codec == reference.audio_codec),
        same_dimensions: rest
            .iter()
            .all(|p| p.width == reference.width && p.height == reference.height),
        same_frame_rate: rest
            .iter()
            .all(|p| frame_rates_match(p.frame_rate, reference.frame_rate)),
    })
}

/// Both absent match; one absent never matches.
fn frame_rates_match(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() < FRAME_RATE_TOLERANCE,
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn probe(name: &str) -> MediaProbe {
        MediaProbe {
            path: PathBuf::from(name),
            video_codec: Some("h264".to_string()),
            audio_codec: Some("aac".to_string()),
            width: Some(1080),
            height: Some(1920),
            frame_rate: Some(30.0),
            has_audio: true,
        }
    }

    #[test]
    fn test_identical_probes_are_compatible() {
        let verdict = classify(&[probe("a"), probe("b"), probe("c")]).unwrap();
        assert!(verdict.is_compatible());
    }

    #[test]
    fn test_single_field_mutations_break_compatibility() {
        let mutations: Vec<(&str, fn(&mut MediaProbe))> = vec![
            ("video codec", |p| p.video_codec = Some("hevc".to_string())),
            ("audio presence", |p| {
                p.has_audio = false;
                p.audio_codec = None;
            }),
            ("audio codec", |p| p.audio_codec = Some("mp3".to_string())),
            ("width", |p| p.width = Some(720)),
            ("height", |p| p.height = Some(1280)),
            ("frame rate", |p| p.frame_rate = Some(25.0)),
            ("frame rate absent", |p| p.frame_rate = None),
        ];

        for (name, mutate) in mutations {
            let mut changed = probe("b");
            mutate(&mut changed);
            let verdict = classify(&[probe("a"), changed]).unwrap();
            assert!(!verdict.is_compatible(), "mutating {} should break compatibility", name);
        }
    }

    #[test]
    fn test_frame_rate_tolerance() {
        let mut close = probe("b");
        close.frame_rate = Some(30.005);
        assert!(classify(&[probe("a"), close]).unwrap().same_frame_rate);

        let mut ntsc = probe("b");
        ntsc.frame_rate = Some(29.97);
        assert!(!classify(&[probe("a"), ntsc]).unwrap().same_frame_rate);
    }

    #[test]
    fn test_absent_frame_rates() {
        let mut a = probe("a");
        let mut b = probe("b");
        a.frame_rate = None;
        b.frame_rate = None;
        assert!(classify(&[a.clone(), b]).unwrap().same_frame_rate);

        // Reference absent, other present
        assert!(!classify(&[a, probe("c")]).unwrap().same_frame_rate);
    }

    #[test]
    fn test_audio_codec_ignored_without_audio() {
        let silent = |name| MediaProbe {
            has_audio: false,
            audio_codec: None,
            ..probe(name)
        };
        let verdict = classify(&[silent("a"), silent("b")]).unwrap();
        assert!(verdict.same_audio_codec);
        assert!(verdict.is_compatible());
    }

    #[test]
    fn test_empty_probe_list() {
        assert!(matches!(classify(&[]), Err(MediaError::InvalidInput(_))));
    }

    #[test]
    fn test_single_probe_is_compatible() {
        assert!(classify(&[probe("a")]).unwrap().is_compatible());
    }
}
