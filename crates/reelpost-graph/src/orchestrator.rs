//! Photo, reel and carousel publish flows.
//!
//! Each flow owns one [`PublishJob`] for its duration. Remote containers
//! created before a failure are left on the platform.

use std::sync::Arc;

use reelpost_models::{MediaItem, MediaKind};
use serde::Serialize;
use tracing::info;

use crate::error::{PublishError, PublishResult};
use crate::job::{JobState, PollPolicy, PublishJob};
use crate::poller::RemoteJobPoller;
use crate::target::PublishTarget;
use crate::types::ContainerRequest;

pub const MIN_CAROUSEL_ITEMS: usize = 2;
pub const MAX_CAROUSEL_ITEMS: usize = 10;

/// Polling policies per container kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPolicies {
    pub reel: PollPolicy,
    pub carousel_child: PollPolicy,
    pub carousel_parent: PollPolicy,
}

impl Default for PublishPolicies {
    fn default() -> Self {
        Self {
            reel: PollPolicy::reel(),
            carousel_child: PollPolicy::carousel_child(),
            carousel_parent: PollPolicy::carousel_parent(),
        }
    }
}

impl PublishPolicies {
    /// Same budgets without any waiting.
    pub fn immediate() -> Self {
        let defaults = Self::default();
        Self {
            reel: defaults.reel.immediate(),
            carousel_child: defaults.carousel_child.immediate(),
            carousel_parent: defaults.carousel_parent.immediate(),
        }
    }
}

/// A finished publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Published {
    /// Id of the post on the platform
    pub media_id: String,
    pub container_id: String,
}

pub struct PublishOrchestrator {
    target: Arc<dyn PublishTarget>,
    poller: RemoteJobPoller,
    policies: PublishPolicies,
}

impl PublishOrchestrator {
    pub fn new(target: Arc<dyn PublishTarget>) -> Self {
        Self {
            poller: RemoteJobPoller::new(target.clone()),
            target,
            policies: PublishPolicies::default(),
        }
    }

    pub fn with_policies(mut self, policies: PublishPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Single image post. Image containers need no processing.
    pub async fn publish_photo(&self, image_url: &str, caption: &str) -> PublishResult<Published> {
        info!("Publishing photo post");
        let result: PublishResult<Published> = async {
            let mut job = PublishJob::new(vec![MediaItem::image(image_url)], caption);
            let request = ContainerRequest::Photo {
                image_url: image_url.to_string(),
                caption: caption.to_string(),
            };
            job.mark_submitted(self.target.create_container(&request).await?)?;
            job.mark_ready()?;
            self.finish(&mut job).await
        }
        .await;
        record("photo", result)
    }

    /// Reel post: create, poll until processed, publish.
    pub async fn publish_reel(&self, video_url: &str, caption: &str) -> PublishResult<Published> {
        info!("Publishing reel");
        let result: PublishResult<Published> = async {
            let mut job = PublishJob::new(vec![MediaItem::video(video_url)], caption);
            let request = ContainerRequest::Reel {
                video_url: video_url.to_string(),
                caption: caption.to_string(),
            };
            job.mark_submitted(self.target.create_container(&request).await?)?;
            self.poller.poll_job(&mut job, &self.policies.reel).await?;
            self.finish(&mut job).await
        }
        .await;
        record("reel", result)
    }

    /// Carousel of 2 to 10 items, kept in the given order.
    ///
    /// Children are created one at a time; video children are polled to
    /// completion before the next child is created.
    pub async fn publish_carousel(&self, items: &[MediaItem], caption: &str) -> PublishResult<Published> {
        if !(MIN_CAROUSEL_ITEMS..=MAX_CAROUSEL_ITEMS).contains(&items.len()) {
            return record(
                "carousel",
                Err(PublishError::invalid_input(format!(
                    "carousel needs {} to {} items, got {}",
                    MIN_CAROUSEL_ITEMS,
                    MAX_CAROUSEL_ITEMS,
                    items.len()
                ))),
            );
        }

        let result: PublishResult<Published> = async {
            info!("Creating {} carousel child containers", items.len());
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                children.push(self.create_child(item).await?);
            }

            info!("Creating carousel container");
            let mut job = PublishJob::new(items.to_vec(), caption);
            let request = ContainerRequest::Carousel {
                children,
                caption: caption.to_string(),
            };
            job.mark_submitted(self.target.create_container(&request).await?)?;
            self.poller
                .poll_job(&mut job, &self.policies.carousel_parent)
                .await?;
            self.finish(&mut job).await
        }
        .await;
        record("carousel", result)
    }

    async fn create_child(&self, item: &MediaItem) -> PublishResult<String> {
        let mut job = PublishJob::new(vec![item.clone()], "");
        let request = match item.kind {
            MediaKind::Image => ContainerRequest::CarouselImage {
                image_url: item.url.clone(),
            },
            MediaKind::Video => ContainerRequest::CarouselVideo {
                video_url: item.url.clone(),
            },
        };

        let id = job.mark_submitted(self.target.create_container(&request).await?)?;
        if item.kind.needs_processing() {
            self.poller
                .poll_job(&mut job, &self.policies.carousel_child)
                .await?;
        } else {
            job.mark_ready()?;
        }
        Ok(id)
    }

    async fn finish(&self, job: &mut PublishJob) -> PublishResult<Published> {
        let container_id = match (&job.container_id, job.state) {
            (Some(id), JobState::Ready) => id.clone(),
            _ => {
                return Err(PublishError::InvalidState(format!(
                    "cannot publish a job in state {}",
                    job.state.as_str()
                )))
            }
        };

        let media_id = self
            .target
            .publish(&container_id)
            .await?
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PublishError::submission("platform returned no published media id"))?;
        job.mark_published()?;

        Ok(Published {
            media_id,
            container_id,
        })
    }
}

fn record(kind: &'static str, result: PublishResult<Published>) -> PublishResult<Published> {
    let outcome = match &result {
        Ok(published) => {
            info!(kind, media_id = %published.media_id, "Published");
            "published"
        }
        Err(PublishError::InvalidInput(_)) => "invalid_input",
        Err(PublishError::PollTimeout { .. }) => "timeout",
        Err(PublishError::RemoteProcessing { .. }) => "remote_error",
        Err(_) => "failed",
    };
    metrics::counter!("reelpost_publishes_total", "kind" => kind, "outcome" => outcome).increment(1);
    result
}
