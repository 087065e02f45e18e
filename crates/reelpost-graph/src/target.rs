//! Remote publishing platform seam.

use async_trait::async_trait;

use crate::error::PublishResult;
use crate::types::{ContainerRequest, StatusCode};

/// The three calls a publish flow needs from the platform.
///
/// Missing identifiers are reported as `None` so the orchestrator decides
/// how to fail.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    async fn create_container(&self, request: &ContainerRequest) -> PublishResult<Option<String>>;

    async fn get_status(&self, container_id: &str) -> PublishResult<StatusCode>;

    async fn publish(&self, container_id: &str) -> PublishResult<Option<String>>;
}
