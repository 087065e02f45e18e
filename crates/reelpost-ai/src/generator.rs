//! Content generation seam.

use async_trait::async_trait;

use crate::content::Fact;
use crate::error::AiResult;

/// Text, image and speech generation used by one pipeline run.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// One short fact in `niche`.
    async fn generate_fact(&self, niche: &str) -> AiResult<Fact>;

    /// Base64 PNG for `prompt`.
    async fn generate_image(&self, prompt: &str) -> AiResult<String>;

    /// Narration audio (MP3 bytes).
    async fn synthesize_speech(&self, text: &str) -> AiResult<Vec<u8>>;
}
