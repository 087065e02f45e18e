//! Production collaborators shared by both binaries.

use std::sync::Arc;
use std::time::Duration;

use reelpost_graph::{GraphClient, PublishOrchestrator};
use reelpost_media::{FfmpegRunner, VideoAssembler};
use reelpost_storage::S3BlobStore;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;

pub struct Services {
    pub store: Arc<S3BlobStore>,
    pub graph: Arc<GraphClient>,
    pub assembler: VideoAssembler,
}

impl Services {
    /// Build the S3 store, Graph client and FFmpeg assembler from the environment.
    pub async fn from_env(config: &WorkerConfig) -> WorkerResult<Self> {
        let store = Arc::new(S3BlobStore::from_env().await?);
        let graph = Arc::new(GraphClient::from_env()?);

        let runner = match config.encode_timeout {
            Some(timeout) => FfmpegRunner::new().with_timeout(timeout.as_secs()),
            None => FfmpegRunner::new(),
        };
        let assembler = VideoAssembler::new(config.work_dir.clone(), config.reel.clone())
            .with_runner(Arc::new(runner));

        Ok(Self {
            store,
            graph,
            assembler,
        })
    }

    pub fn publisher(&self) -> PublishOrchestrator {
        PublishOrchestrator::new(self.graph.clone())
    }

    pub fn presign_ttl(&self) -> Duration {
        self.store.presign_ttl()
    }
}
