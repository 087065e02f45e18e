//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reelpost_models::{CombineMode, PostKind, ReelSettings};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between scheduled runs
    pub run_interval: Duration,
    /// Comma-separated niche list
    pub niches: String,
    /// Appended to every caption after a blank line
    pub caption_suffix: String,
    /// Reel geometry and duration
    pub reel: ReelSettings,
    /// Which posts a run creates
    pub create_media: Vec<PostKind>,
    /// How the combinator publishes collected reels
    pub combo_mode: CombineMode,
    /// Scratch directory for encodes
    pub work_dir: PathBuf,
    /// Where rendered reels are kept for later compilation
    pub reels_dir: PathBuf,
    /// Wall-clock limit for one FFmpeg invocation
    pub encode_timeout: Option<Duration>,
    /// Prometheus listener; disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            run_interval: Duration::from_secs(6 * 60 * 60),
            niches: "random interesting facts".to_string(),
            caption_suffix: String::new(),
            reel: ReelSettings::default(),
            create_media: PostKind::ALL.to_vec(),
            combo_mode: CombineMode::default(),
            work_dir: PathBuf::from(".work"),
            reels_dir: PathBuf::from(".reels"),
            encode_timeout: Some(Duration::from_secs(600)),
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WorkerResult<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let reel = defaults
            .reel
            .clone()
            .with_duration(parse_or(&get, "REEL_DURATION", defaults.reel.duration_secs)?)
            .with_margin(parse_or(&get, "REEL_MARGIN", defaults.reel.margin)?);
        if reel.duration_secs == 0 {
            return Err(WorkerError::config_error("REEL_DURATION must be positive"));
        }

        let create_media = match get("CREATE_MEDIA") {
            Some(csv) => PostKind::parse_list(&csv)
                .map_err(|e| WorkerError::config_error(format!("CREATE_MEDIA: {}", e)))?,
            None => defaults.create_media,
        };

        let combo_mode = match get("COMBO_MODE") {
            Some(mode) => mode
                .parse()
                .map_err(|e| WorkerError::config_error(format!("COMBO_MODE: {}", e)))?,
            None => defaults.combo_mode,
        };

        let encode_timeout = match parse_or(&get, "ENCODE_TIMEOUT_SECS", 600u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let metrics_addr = get("METRICS_ADDR")
            .map(|addr| {
                addr.parse::<SocketAddr>()
                    .map_err(|_| WorkerError::config_error(format!("METRICS_ADDR is not an address: {}", addr)))
            })
            .transpose()?;

        let run_interval = parse_or(&get, "RUN_INTERVAL_SECS", defaults.run_interval.as_secs())?;
        if run_interval == 0 {
            return Err(WorkerError::config_error("RUN_INTERVAL_SECS must be positive"));
        }

        Ok(Self {
            run_interval: Duration::from_secs(run_interval),
            niches: get("NICHES").unwrap_or(defaults.niches),
            caption_suffix: get("CAPTION_SUFFIX").unwrap_or(defaults.caption_suffix),
            reel,
            create_media,
            combo_mode,
            work_dir: get("WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            reels_dir: get("REELS_DIR").map(PathBuf::from).unwrap_or(defaults.reels_dir),
            encode_timeout,
            metrics_addr,
        })
    }

    pub fn creates(&self, kind: PostKind) -> bool {
        self.create_media.contains(&kind)
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> WorkerResult<T> {
    match get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| WorkerError::config_error(format!("{} has an invalid value: {}", name, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> WorkerResult<WorkerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.run_interval, Duration::from_secs(21600));
        assert_eq!(config.niches, "random interesting facts");
        assert_eq!(config.create_media, vec![PostKind::Post, PostKind::Reel]);
        assert_eq!(config.combo_mode, CombineMode::Carousel);
        assert_eq!(config.reel.duration_secs, 12);
        assert_eq!(config.reel.margin, 24);
        assert_eq!(config.reels_dir, PathBuf::from(".reels"));
        assert_eq!(config.encode_timeout, Some(Duration::from_secs(600)));
        assert!(config.metrics_addr.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("CREATE_MEDIA", "reel"),
            ("COMBO_MODE", " Reel "),
            ("REEL_DURATION", "8"),
            ("CAPTION_SUFFIX", "#facts"),
            ("ENCODE_TIMEOUT_SECS", "0"),
            ("METRICS_ADDR", "127.0.0.1:9464"),
        ])
        .unwrap();

        assert_eq!(config.create_media, vec![PostKind::Reel]);
        assert!(!config.creates(PostKind::Post));
        assert_eq!(config.combo_mode, CombineMode::Reel);
        assert_eq!(config.reel.duration_secs, 8);
        assert_eq!(config.caption_suffix, "#facts");
        assert_eq!(config.encode_timeout, None);
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9464".parse().unwrap()));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(matches!(config(&[("CREATE_MEDIA", "post,story")]), Err(WorkerError::ConfigError(_))));
        assert!(matches!(config(&[("COMBO_MODE", "grid")]), Err(WorkerError::ConfigError(_))));
        assert!(matches!(config(&[("REEL_DURATION", "twelve")]), Err(WorkerError::ConfigError(_))));
        assert!(matches!(config(&[("RUN_INTERVAL_SECS", "0")]), Err(WorkerError::ConfigError(_))));
        assert!(matches!(config(&[("METRICS_ADDR", "nowhere")]), Err(WorkerError::ConfigError(_))));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config(&[("NICHES", "  "), ("CREATE_MEDIA", "")]).unwrap();
        assert_eq!(config.niches, "random interesting facts");
        assert_eq!(config.create_media.len(), 2);
    }
}
