//! Video assembler entry point.
//!
//! Holds the collaborators shared by both assembly flows:
//! - [`crate::reel`] turns a poster image into a vertical reel
//! - [`crate::concat`] joins several clips into one video

use std::path::PathBuf;
use std::sync::Arc;

use reelpost_models::ReelSettings;

use crate::command::{EncodeRunner, FfmpegRunner};
use crate::probe::{FfprobeInspector, ProbeInspector};
use crate::workdir::WorkDir;

/// Builds reels and combined videos inside a private working directory.
#[derive(Clone)]
pub struct VideoAssembler {
    pub(crate) work_dir: WorkDir,
    pub(crate) settings: ReelSettings,
    pub(crate) inspector: Arc<dyn ProbeInspector>,
    pub(crate) runner: Arc<dyn EncodeRunner>,
}

impl VideoAssembler {
    /// Create an assembler backed by the real `ffprobe`/`ffmpeg` binaries.
    pub fn new(work_dir: impl Into<PathBuf>, settings: ReelSettings) -> Self {
        Self {
            work_dir: WorkDir::new(work_dir),
            settings,
            inspector: Arc::new(FfprobeInspector::new()),
            runner: Arc::new(FfmpegRunner::new()),
        }
    }

    /// Replace the probe implementation.
    pub fn with_inspector(mut self, inspector: Arc<dyn ProbeInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    /// Replace the encode runner (e.g. one with a timeout).
    pub fn with_runner(mut self, runner: Arc<dyn EncodeRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn settings(&self) -> &ReelSettings {
        &self.settings
    }

    pub fn work_dir(&self) -> &WorkDir {
        &self.work_dir
    }
}

impl std::fmt::Debug for VideoAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoAssembler")
            .field("work_dir", &self.work_dir)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
