//! S3 client implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use tracing::{debug, info};

use crate::blob::{check_payload, normalize_key, sha256_base64, BlobStore};
use crate::error::{StorageError, StorageResult};

/// Default lifetime of presigned URLs.
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name
    pub bucket_name: String,
    pub region: String,
    /// Static credentials; the default provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,
    /// Lifetime of URLs handed to the publishing platform
    pub presign_ttl: Duration,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let optional = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let presign_ttl = match optional("AWS_S3_PRESIGN_TTL_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                StorageError::config_error(format!(
                    "AWS_S3_PRESIGN_TTL_SECONDS must be a number of seconds, got {:?}",
                    raw
                ))
            })?,
            None => DEFAULT_PRESIGN_TTL_SECS,
        };

        Ok(Self {
            bucket_name: optional("AWS_S3_BUCKET")
                .ok_or_else(|| StorageError::config_error("AWS_S3_BUCKET not set"))?,
            region: optional("S3_REGION").unwrap_or_else(|| "eu-central-1".to_string()),
            access_key_id: optional("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            endpoint_url: optional("S3_ENDPOINT_URL"),
            presign_ttl: Duration::from_secs(presign_ttl),
        })
    }
}

/// S3-backed [`BlobStore`].
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    presign_ttl: Duration,
}

impl S3BlobStore {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let region = Region::new(config.region.clone());

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => {
                let credentials = Credentials::new(key, secret, None, None, "env");
                Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            (None, None) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::config_error(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together",
                ))
            }
        };

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name,
            presign_ttl: config.presign_ttl,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Configured presign lifetime.
    pub fn presign_ttl(&self) -> Duration {
        self.presign_ttl
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        check_payload(&bytes, content_type)?;
        let key = normalize_key(key)?;
        let size = bytes.len();
        debug!("Uploading {} bytes to {}", size, key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .checksum_sha256(sha256_base64(&bytes))
            .server_side_encryption(ServerSideEncryption::Aes256);

        if content_type.starts_with("image/") {
            request = request.content_disposition("inline");
        }

        request
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", key, e)))?;

        info!(bucket = %self.bucket, key = %key, size, "Uploaded object");
        Ok(())
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let key = normalize_key(key)?;
        let presign_config = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("bucket", &self.bucket)
            .field("presign_ttl", &self.presign_ttl)
            .finish_non_exhaustive()
    }
}
