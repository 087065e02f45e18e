//! One scheduled run: fact, poster, optional reel, publish.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reelpost_ai::{pick_niche, poster_prompt, AiError, ContentGenerator, Fact};
use reelpost_graph::{PublishOrchestrator, Published};
use reelpost_media::VideoAssembler;
use reelpost_models::PostKind;
use reelpost_storage::{decode_png_base64, upload_bytes, upload_file, BlobStore, StorageError};
use serde::Serialize;
use tracing::Instrument;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::retry::{retry_async_when, RetryConfig};

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub fact: Fact,
    pub poster_url: String,
    pub reel_url: Option<String>,
    pub published: Vec<(PostKind, Published)>,
}

/// Object key for a poster: spaces in the niche become underscores.
pub fn poster_key(niche: &str, millis: i64) -> String {
    format!("posters/{}_{}.png", niche.replace(' ', "_"), millis)
}

pub fn reel_file_name(millis: i64) -> String {
    format!("reel-{}.mp4", millis)
}

/// Fact, blank line, suffix; trimmed so an empty suffix leaves no tail.
pub fn build_caption(fact: &str, suffix: &str) -> String {
    format!("{}\n\n{}", fact, suffix).trim().to_string()
}

/// Scheduled content pipeline.
pub struct Pipeline {
    config: WorkerConfig,
    generator: Arc<dyn ContentGenerator>,
    store: Arc<dyn BlobStore>,
    assembler: VideoAssembler,
    publisher: PublishOrchestrator,
    presign_ttl: Duration,
    retry: RetryConfig,
}

impl Pipeline {
    pub fn new(
        config: WorkerConfig,
        generator: Arc<dyn ContentGenerator>,
        store: Arc<dyn BlobStore>,
        assembler: VideoAssembler,
        publisher: PublishOrchestrator,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            config,
            generator,
            store,
            assembler,
            publisher,
            presign_ttl,
            retry: RetryConfig::default(),
        }
    }

    /// Override the backoff used around AI calls and uploads.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Execute one run. Any error aborts the remaining steps.
    pub async fn run_once(&self) -> WorkerResult<RunReport> {
        let logger = RunLogger::new("scheduled_run");
        let started = Instant::now();

        let result = self.run_steps(&logger).instrument(logger.create_span()).await;

        match &result {
            Ok(report) => {
                logger.log_completion(&format!("published {} item(s)", report.published.len()));
                metrics::record_run("success", started.elapsed());
            }
            Err(e) => {
                logger.log_error(&format!("{} failure: {}", e.kind(), e));
                metrics::record_run("failure", started.elapsed());
            }
        }
        result
    }

    async fn run_steps(&self, logger: &RunLogger) -> WorkerResult<RunReport> {
        let niche = pick_niche(&self.config.niches)?;
        logger.log_start(&format!("niche \"{}\"", niche));

        let fact = retry_async_when(&self.retry.named("generate_fact"), AiError::is_retryable, || {
            self.generator.generate_fact(&niche)
        })
        .await
        .into_result()?;

        let prompt = poster_prompt(&fact.text, &niche);
        let poster_b64 = retry_async_when(&self.retry.named("generate_image"), AiError::is_retryable, || {
            self.generator.generate_image(&prompt)
        })
        .await
        .into_result()?;
        let poster = decode_png_base64(&poster_b64)?;
        logger.log_progress(&format!("poster generated ({} bytes)", poster.len()));

        let wants_reel = self.config.creates(PostKind::Reel);
        let narration = if wants_reel {
            match self.generator.synthesize_speech(&fact.text).await {
                Ok(audio) => Some(audio),
                Err(e) => {
                    logger.log_warning(&format!(
                        "speech synthesis failed, reel gets a silent track: {}",
                        e
                    ));
                    metrics::record_speech_fallback();
                    None
                }
            }
        } else {
            None
        };

        let millis = chrono::Utc::now().timestamp_millis();
        let key = poster_key(&niche, millis);
        let poster_url = self.upload(poster.clone(), &key, "image/png").await?;
        logger.log_progress(&format!("poster uploaded to {}", key));

        let reel_url = if wants_reel {
            let video = self.assembler.make_reel(&poster, narration.as_deref()).await?;
            let file_name = reel_file_name(millis);
            let url = self
                .upload_path(&video, &format!("reels/{}", file_name), "video/mp4")
                .await?;
            self.archive_reel(&video, &file_name).await?;
            logger.log_progress(&format!("reel uploaded as {}", file_name));
            Some(url)
        } else {
            None
        };

        let caption = build_caption(&fact.text, &self.config.caption_suffix);
        let mut published = Vec::new();

        if self.config.creates(PostKind::Post) {
            published.push((
                PostKind::Post,
                self.publisher.publish_photo(&poster_url, &caption).await?,
            ));
        }
        if let Some(url) = &reel_url {
            published.push((PostKind::Reel, self.publisher.publish_reel(url, &caption).await?));
        }

        Ok(RunReport {
            run_id: logger.run_id().to_string(),
            fact,
            poster_url,
            reel_url,
            published,
        })
    }

    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> WorkerResult<String> {
        let url = retry_async_when(
            &self.retry.named(format!("upload {}", key)),
            StorageError::is_retryable,
            || upload_bytes(self.store.as_ref(), bytes.clone(), key, content_type, self.presign_ttl),
        )
        .await
        .into_result()?;
        metrics::record_upload(content_type);
        Ok(url)
    }

    async fn upload_path(&self, path: &Path, key: &str, content_type: &str) -> WorkerResult<String> {
        let url = retry_async_when(
            &self.retry.named(format!("upload {}", key)),
            StorageError::is_retryable,
            || upload_file(self.store.as_ref(), path, key, content_type, self.presign_ttl),
        )
        .await
        .into_result()?;
        metrics::record_upload(content_type);
        Ok(url)
    }

    /// Keep a copy of the reel for later compilations.
    async fn archive_reel(&self, video: &Path, file_name: &str) -> WorkerResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.reels_dir).await?;
        let target = self.config.reels_dir.join(file_name);
        tokio::fs::copy(video, &target).await?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reelpost_ai::AiResult;
    use reelpost_graph::{
        ContainerRequest, PublishPolicies, PublishResult, PublishTarget, StatusCode,
    };
    use reelpost_media::{EncodeRunner, FfmpegCommand, MediaResult};
    use reelpost_models::ReelSettings;
    use reelpost_storage::StorageResult;
    use tempfile::TempDir;

    // 1x1 PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    struct FakeGenerator {
        speech_fails: bool,
    }

    #[async_trait]
    impl ContentGenerator for FakeGenerator {
        async fn generate_fact(&self, niche: &str) -> AiResult<Fact> {
            Ok(Fact {
                text: "Octopuses have three hearts.".to_string(),
                niche: niche.to_string(),
            })
        }

        async fn generate_image(&self, _prompt: &str) -> AiResult<String> {
            Ok(PNG_B64.to_string())
        }

        async fn synthesize_speech(&self, _text: &str) -> AiResult<Vec<u8>> {
            if self.speech_fails {
                Err(AiError::Api {
                    status: 500,
                    body: "tts down".into(),
                })
            } else {
                Ok(b"ID3narration".to_vec())
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl BlobStore for MemoryStore {
        async fn put(&self, _bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), content_type.to_string());
            Ok(())
        }

        async fn presigned_get(&self, key: &str, _ttl: Duration) -> StorageResult<String> {
            Ok(format!("https://blobs.test/{}", key))
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        created: Mutex<Vec<ContainerRequest>>,
    }

    #[async_trait]
    impl PublishTarget for RecordingTarget {
        async fn create_container(&self, request: &ContainerRequest) -> PublishResult<Option<String>> {
            let mut created = self.created.lock().unwrap();
            created.push(request.clone());
            Ok(Some(format!("c{}", created.len())))
        }

        async fn get_status(&self, _container_id: &str) -> PublishResult<StatusCode> {
            Ok(StatusCode::Finished)
        }

        async fn publish(&self, container_id: &str) -> PublishResult<Option<String>> {
            Ok(Some(format!("media-{}", container_id)))
        }
    }

    /// Writes an empty output instead of encoding.
    struct TouchRunner {
        commands: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl EncodeRunner for TouchRunner {
        async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
            self.commands.lock().unwrap().push(cmd.build_args());
            tokio::fs::write(cmd.output(), b"mp4").await?;
            Ok(())
        }
    }

    struct Harness {
        dir: TempDir,
        store: Arc<MemoryStore>,
        target: Arc<RecordingTarget>,
        runner: Arc<TouchRunner>,
        pipeline: Pipeline,
    }

    fn harness(create_media: Vec<PostKind>, speech_fails: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let config = WorkerConfig {
            niches: "marine biology".to_string(),
            caption_suffix: "#facts".to_string(),
            create_media,
            work_dir: dir.path().join(".work"),
            reels_dir: dir.path().join(".reels"),
            ..WorkerConfig::default()
        };

        let store = Arc::new(MemoryStore::default());
        let target = Arc::new(RecordingTarget::default());
        let runner = Arc::new(TouchRunner {
            commands: Mutex::new(Vec::new()),
        });
        let assembler = VideoAssembler::new(config.work_dir.clone(), ReelSettings::default())
            .with_runner(runner.clone());
        let publisher = PublishOrchestrator::new(target.clone()).with_policies(PublishPolicies::immediate());

        let pipeline = Pipeline::new(
            config,
            Arc::new(FakeGenerator { speech_fails }),
            store.clone(),
            assembler,
            publisher,
            Duration::from_secs(3600),
        )
        .with_retry(RetryConfig::default().with_base_delay(Duration::from_millis(1)));

        Harness {
            dir,
            store,
            target,
            runner,
            pipeline,
        }
    }

    #[test]
    fn test_keys_and_caption() {
        assert_eq!(poster_key("marine biology", 17), "posters/marine_biology_17.png");
        assert_eq!(reel_file_name(17), "reel-17.mp4");
        assert_eq!(build_caption("Fact.", "#facts"), "Fact.\n\n#facts");
        assert_eq!(build_caption("Fact.", ""), "Fact.");
    }

    #[tokio::test]
    async fn test_post_only_run_publishes_poster() {
        let h = harness(vec![PostKind::Post], false);

        let report = h.pipeline.run_once().await.unwrap();

        assert_eq!(report.fact.niche, "marine biology");
        assert!(report.poster_url.starts_with("https://blobs.test/posters/marine_biology_"));
        assert!(report.reel_url.is_none());
        assert_eq!(h.runner.commands.lock().unwrap().len(), 0);

        let created = h.target.created.lock().unwrap().clone();
        assert_eq!(
            created,
            vec![ContainerRequest::Photo {
                image_url: report.poster_url.clone(),
                caption: "Octopuses have three hearts.\n\n#facts".to_string(),
            }]
        );
        assert_eq!(report.published.len(), 1);
        assert_eq!(report.published[0].0, PostKind::Post);
    }

    #[tokio::test]
    async fn test_reel_run_tolerates_speech_failure() {
        let h = harness(vec![PostKind::Post, PostKind::Reel], true);

        let report = h.pipeline.run_once().await.unwrap();

        let reel_url = report.reel_url.clone().unwrap();
        assert!(reel_url.starts_with("https://blobs.test/reels/reel-"));

        // Silent track because narration failed
        let commands = h.runner.commands.lock().unwrap().clone();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].iter().any(|a| a.starts_with("anullsrc")));

        let objects = h.store.objects.lock().unwrap().clone();
        assert_eq!(objects.values().filter(|t| *t == "video/mp4").count(), 1);
        assert_eq!(objects.values().filter(|t| *t == "image/png").count(), 1);

        let kinds: Vec<_> = report.published.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![PostKind::Post, PostKind::Reel]);

        // Archived for the combinator
        let mut archived = tokio::fs::read_dir(h.dir.path().join(".reels")).await.unwrap();
        let entry = archived.next_entry().await.unwrap().unwrap();
        assert!(reel_url.ends_with(entry.file_name().to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_narration_is_used_when_available() {
        let h = harness(vec![PostKind::Reel], false);

        h.pipeline.run_once().await.unwrap();

        let commands = h.runner.commands.lock().unwrap().clone();
        assert!(commands[0].iter().any(|a| a.ends_with(".mp3")));
        assert!(!commands[0].iter().any(|a| a.starts_with("anullsrc")));
        assert_eq!(h.target.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_niche_list_fails_run() {
        let mut h = harness(vec![PostKind::Post], false);
        h.pipeline.config.niches = " , ".to_string();

        let err = h.pipeline.run_once().await.unwrap_err();
        assert!(matches!(err, WorkerError::Ai(AiError::InvalidInput(_))));
        assert!(h.store.objects.lock().unwrap().is_empty());
    }
}
