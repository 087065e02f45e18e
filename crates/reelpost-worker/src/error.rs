//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] reelpost_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] reelpost_media::MediaError),

    #[error("Publish error: {0}")]
    Publish(#[from] reelpost_graph::PublishError),

    #[error("AI error: {0}")]
    Ai(#[from] reelpost_ai::AiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::ConfigError(_) => "config",
            WorkerError::Storage(_) => "storage",
            WorkerError::Media(_) => "media",
            WorkerError::Publish(_) => "publish",
            WorkerError::Ai(_) => "ai",
            WorkerError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let err: WorkerError = reelpost_media::MediaError::invalid_input("one clip").into();
        assert_eq!(err.kind(), "media");
    }
}
