//! Graph API publishing.
//!
//! This crate provides:
//! - An explicit state machine for remote publish jobs
//! - Bounded status polling with per-kind cadence
//! - Photo, reel and carousel publish flows
//! - The HTTP client implementing [`PublishTarget`]

pub mod client;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod poller;
pub mod target;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{GraphClient, GraphConfig};
pub use error::{PublishError, PublishResult};
pub use job::{JobState, PollPolicy, PublishJob};
pub use orchestrator::{PublishOrchestrator, PublishPolicies, Published};
pub use poller::{PollOutcome, RemoteJobPoller};
pub use target::PublishTarget;
pub use types::{ContainerRequest, Identity, StatusCode};
