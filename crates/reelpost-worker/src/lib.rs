//! Reelpost worker library.
//!
//! This crate provides:
//! - The scheduled fact, poster and reel pipeline
//! - The reel archive combinator
//! - Worker configuration, retry, run logging and metrics

pub mod combinator;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod retry;
pub mod services;

pub use combinator::{list_clips, Combinator};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, RunLogger};
pub use pipeline::{Pipeline, RunReport};
pub use retry::{retry_async, retry_async_when, FailureTracker, RetryConfig};
pub use services::Services;
