//! Publishing error types.

use thiserror::Error;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    /// Caller contract violation; nothing was sent to the platform
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The platform returned no usable identifier
    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Container {container_id} failed remote processing (status {status})")]
    RemoteProcessing { container_id: String, status: String },

    #[error("Container {container_id} not ready after {attempts} polls")]
    PollTimeout { container_id: String, attempts: u32 },

    #[error("Invalid job transition: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graph API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }
}

impl From<reqwest::Error> for PublishError {
    /// Request URLs carry the access token, so it is dropped from the error.
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}
