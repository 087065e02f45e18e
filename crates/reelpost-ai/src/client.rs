//! OpenAI HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::content::{clean_fact, Fact};
use crate::error::{AiError, AiResult};
use crate::generator::ContentGenerator;
use crate::prompts::{fact_user_prompt, FACT_SYSTEM_PROMPT};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const IMAGE_SIZE: &str = "1024x1024";

/// Configuration for the OpenAI client.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub fact_model: String,
    pub image_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    /// Request timeout; image generation is the slow one
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            fact_model: "gpt-4o-mini".to_string(),
            image_model: "gpt-image-1".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            timeout: Duration::from_secs(180),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> AiResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let mut config = Self::new(
            var("OPENAI_API_KEY").ok_or_else(|| AiError::Config("OPENAI_API_KEY not set".into()))?,
        );
        if let Some(base) = var("OPENAI_BASE_URL") {
            config.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = var("OPENAI_FACT_MODEL") {
            config.fact_model = model;
        }
        if let Some(model) = var("OPENAI_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(model) = var("OPENAI_TTS_MODEL") {
            config.tts_model = model;
        }
        if let Some(voice) = var("OPENAI_TTS_VOICE") {
            config.tts_voice = voice;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("fact_model", &self.fact_model)
            .field("image_model", &self.image_model)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    output_format: &'a str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

/// [`ContentGenerator`] backed by the OpenAI REST API.
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AiResult<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/{}", self.config.base_url, endpoint))
            .bearer_auth(&self.config.api_key)
    }

    async fn send(request: RequestBuilder) -> AiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn generate_fact(&self, niche: &str) -> AiResult<Fact> {
        let user_prompt = fact_user_prompt(niche);
        let request = ChatRequest {
            model: &self.config.fact_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: FACT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        debug!(model = %self.config.fact_model, niche, "Requesting fact");
        let response = Self::send(self.post("chat/completions").json(&request)).await?;
        let body: ChatResponse = serde_json::from_str(&response.text().await?)?;

        let raw = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let fact = Fact {
            text: clean_fact(&raw),
            niche: niche.to_string(),
        };
        info!(niche, "Generated fact: {}", fact.text);
        Ok(fact)
    }

    async fn generate_image(&self, prompt: &str) -> AiResult<String> {
        let request = ImageRequest {
            model: &self.config.image_model,
            prompt,
            size: IMAGE_SIZE,
            output_format: "png",
            n: 1,
        };

        debug!(model = %self.config.image_model, "Requesting poster image");
        let response = Self::send(self.post("images/generations").json(&request)).await?;
        let body: ImageResponse = serde_json::from_str(&response.text().await?)?;

        body.data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|b64| !b64.is_empty())
            .ok_or_else(|| AiError::EmptyResponse("image generation returned no data".into()))
    }

    async fn synthesize_speech(&self, text: &str) -> AiResult<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.config.tts_model,
            voice: &self.config.tts_voice,
            input: text,
        };

        let response = Self::send(self.post("audio/speech").json(&request)).await?;
        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(AiError::EmptyResponse("speech synthesis returned no audio".into()));
        }
        debug!("Synthesized {} bytes of narration", bytes.len());
        Ok(bytes)
    }
}
