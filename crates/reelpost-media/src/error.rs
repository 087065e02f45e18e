//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media assembly.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Assembly failed: {message}")]
    Assembly {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a probe failure error.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an assembly failure error.
    pub fn assembly(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Assembly {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Diagnostic output from the failing tool, if any was captured.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Assembly { stderr, .. } => stderr.as_deref(),
            Self::Probe { message, .. } => Some(message),
            _ => None,
        }
    }
}
