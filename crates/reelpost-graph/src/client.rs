//! Graph API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{PublishError, PublishResult};
use crate::target::PublishTarget;
use crate::types::{ContainerRequest, GraphObject, Identity, StatusCode, StatusResponse};

pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com/v23.0";

/// Configuration for the Graph client.
#[derive(Clone)]
pub struct GraphConfig {
    /// Versioned API root, without trailing slash
    pub base_url: String,
    /// Account that owns the media
    pub user_id: String,
    pub access_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl GraphConfig {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE.to_string(),
            user_id: user_id.into(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> PublishResult<Self> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PublishError::Config(format!("{} not set", name)))
        };

        let mut config = Self::new(required("IG_USER_ID")?, required("IG_ACCESS_TOKEN")?);
        if let Ok(base) = std::env::var("IG_GRAPH_BASE") {
            if !base.trim().is_empty() {
                config = config.with_base_url(base.trim());
            }
        }
        config.timeout = Duration::from_secs(
            std::env::var("IG_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        );
        Ok(config)
    }
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`PublishTarget`] over the Graph API.
pub struct GraphClient {
    http: Client,
    config: GraphConfig,
}

impl GraphClient {
    pub fn new(config: GraphConfig) -> PublishResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PublishError::from)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> PublishResult<Self> {
        Self::new(GraphConfig::from_env()?)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Account id and username behind the token.
    pub async fn identity(&self) -> PublishResult<Identity> {
        let url = format!("{}/{}", self.config.base_url, self.config.user_id);
        self.send(
            self.http
                .get(&url)
                .query(&[("fields", "id,username"), ("access_token", self.token())]),
        )
        .await
    }

    fn token(&self) -> &str {
        &self.config.access_token
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PublishResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PublishError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PublishTarget for GraphClient {
    async fn create_container(&self, request: &ContainerRequest) -> PublishResult<Option<String>> {
        let url = format!("{}/{}/media", self.config.base_url, self.config.user_id);
        debug!(kind = request.label(), "Creating media container");

        let mut query = request.query();
        query.push(("access_token", self.config.access_token.clone()));

        let object: GraphObject = self.send(self.http.post(&url).query(&query)).await?;
        Ok(object.into_id())
    }

    async fn get_status(&self, container_id: &str) -> PublishResult<StatusCode> {
        let url = format!("{}/{}", self.config.base_url, container_id);
        let response: StatusResponse = self
            .send(
                self.http
                    .get(&url)
                    .query(&[("fields", "status_code,status"), ("access_token", self.token())]),
            )
            .await?;
        Ok(response.code())
    }

    async fn publish(&self, container_id: &str) -> PublishResult<Option<String>> {
        let url = format!("{}/{}/media_publish", self.config.base_url, self.config.user_id);
        let object: GraphObject = self
            .send(
                self.http
                    .post(&url)
                    .query(&[("creation_id", container_id), ("access_token", self.token())]),
            )
            .await?;
        Ok(object.into_id())
    }
}
