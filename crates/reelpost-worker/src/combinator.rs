//! Compile archived reels into one post.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use reelpost_graph::orchestrator::MAX_CAROUSEL_ITEMS;
use reelpost_graph::{PublishOrchestrator, Published};
use reelpost_media::VideoAssembler;
use reelpost_models::{CombineMode, MediaItem};
use reelpost_storage::{upload_file, BlobStore, StorageError};
use tracing::{info, warn};

use crate::error::WorkerResult;
use crate::metrics;
use crate::retry::{retry_async_when, RetryConfig};

pub const COMPILATION_CAPTION: &str = "Random interesting facts compilation.";

/// Regular files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub async fn list_clips(dir: &Path) -> WorkerResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut clips = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            clips.push(entry.path());
        }
    }
    clips.sort();
    Ok(clips)
}

/// Publishes the reels archive as one combined reel or one carousel.
pub struct Combinator {
    mode: CombineMode,
    reels_dir: PathBuf,
    caption_suffix: String,
    store: Arc<dyn BlobStore>,
    assembler: VideoAssembler,
    publisher: PublishOrchestrator,
    presign_ttl: Duration,
    retry: RetryConfig,
}

impl Combinator {
    pub fn new(
        mode: CombineMode,
        reels_dir: impl Into<PathBuf>,
        caption_suffix: impl Into<String>,
        store: Arc<dyn BlobStore>,
        assembler: VideoAssembler,
        publisher: PublishOrchestrator,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            mode,
            reels_dir: reels_dir.into(),
            caption_suffix: caption_suffix.into(),
            store,
            assembler,
            publisher,
            presign_ttl,
            retry: RetryConfig::new("combinator"),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn caption(&self) -> String {
        format!("{}\n\n{}", COMPILATION_CAPTION, self.caption_suffix)
            .trim()
            .to_string()
    }

    /// Publish the archive. `Ok(None)` when fewer than two clips exist.
    pub async fn run(&self) -> WorkerResult<Option<Published>> {
        let clips = list_clips(&self.reels_dir).await?;
        if clips.len() < 2 {
            warn!(
                "Not enough reels to combine in {} ({} found)",
                self.reels_dir.display(),
                clips.len()
            );
            return Ok(None);
        }

        let result = match self.mode {
            CombineMode::Reel => self.publish_combined(&clips).await,
            CombineMode::Carousel => self.publish_carousel(&clips).await,
        };

        metrics::record_compilation(
            self.mode.as_str(),
            if result.is_ok() { "success" } else { "failure" },
        );
        result.map(Some)
    }

    async fn publish_combined(&self, clips: &[PathBuf]) -> WorkerResult<Published> {
        let job = self.assembler.combine(clips, None).await?;
        let key = format!("combined/combined-{}.mp4", chrono::Utc::now().timestamp_millis());

        let url = retry_async_when(
            &self.retry.named(format!("upload {}", key)),
            StorageError::is_retryable,
            || upload_file(self.store.as_ref(), &job.output, &key, "video/mp4", self.presign_ttl),
        )
        .await
        .into_result()?;
        metrics::record_upload("video/mp4");

        info!(
            clips = clips.len(),
            strategy = job.strategy.as_str(),
            "Publishing combined reel {}",
            key
        );
        Ok(self.publisher.publish_reel(&url, &self.caption()).await?)
    }

    async fn publish_carousel(&self, clips: &[PathBuf]) -> WorkerResult<Published> {
        // The newest clips win when the archive outgrows one carousel
        let clips = &clips[clips.len().saturating_sub(MAX_CAROUSEL_ITEMS)..];

        let keys: Vec<String> = clips
            .iter()
            .filter_map(|clip| clip.file_name())
            .map(|name| format!("reels/{}", name.to_string_lossy()))
            .collect();

        let urls = try_join_all(
            keys.iter()
                .map(|key| self.store.presigned_get(key, self.presign_ttl)),
        )
        .await?;

        info!(items = urls.len(), "Publishing reel carousel");
        let items: Vec<MediaItem> = urls.into_iter().map(MediaItem::video).collect();
        Ok(self.publisher.publish_carousel(&items, &self.caption()).await?)
    }
}
