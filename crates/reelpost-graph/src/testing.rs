//! Scripted in-memory platform used by the publish tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PublishResult;
use crate::target::PublishTarget;
use crate::types::{ContainerRequest, StatusCode};

/// Hands out ids `c1`, `c2`, ... and replays scripted statuses per id.
/// Unscripted polls report `IN_PROGRESS`.
#[derive(Default)]
pub struct ScriptedTarget {
    statuses: Mutex<HashMap<String, VecDeque<StatusCode>>>,
    created: Mutex<Vec<ContainerRequest>>,
    polled: Mutex<Vec<String>>,
    published: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    omit_container_id: bool,
    omit_media_id: bool,
}

impl ScriptedTarget {
    /// Container creation succeeds but returns no id.
    pub fn without_container_ids() -> Self {
        Self {
            omit_container_id: true,
            ..Self::default()
        }
    }

    /// Publishing succeeds but returns no media id.
    pub fn without_media_ids() -> Self {
        Self {
            omit_media_id: true,
            ..Self::default()
        }
    }

    pub fn script(&self, container_id: &str, statuses: impl IntoIterator<Item = StatusCode>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(container_id.to_string(), statuses.into_iter().collect());
    }

    pub fn created(&self) -> Vec<ContainerRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.polled.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishTarget for ScriptedTarget {
    async fn create_container(&self, request: &ContainerRequest) -> PublishResult<Option<String>> {
        self.created.lock().unwrap().push(request.clone());
        if self.omit_container_id {
            return Ok(None);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(format!("c{}", n)))
    }

    async fn get_status(&self, container_id: &str) -> PublishResult<StatusCode> {
        self.polled.lock().unwrap().push(container_id.to_string());
        let next = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(container_id)
            .and_then(|queue| queue.pop_front());
        Ok(next.unwrap_or(StatusCode::InProgress))
    }

    async fn publish(&self, container_id: &str) -> PublishResult<Option<String>> {
        self.published.lock().unwrap().push(container_id.to_string());
        if self.omit_media_id {
            return Ok(None);
        }
        Ok(Some(format!("media-{}", container_id)))
    }
}
