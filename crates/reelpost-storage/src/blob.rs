//! Blob store abstraction.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{StorageError, StorageResult};
use crate::png::is_png;

/// Object storage that can hand out time-limited public URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`.
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()>;

    /// Signed GET URL valid for `ttl`.
    async fn presigned_get(&self, key: &str, ttl: Duration) -> StorageResult<String>;
}

/// Strip leading slashes; an empty key is rejected.
pub fn normalize_key(key: &str) -> StorageResult<String> {
    let key = key.trim_start_matches('/');
    if key.is_empty() {
        return Err(StorageError::InvalidKey("object key is empty".to_string()));
    }
    Ok(key.to_string())
}

/// Base64 SHA-256 digest, the form S3 expects for `x-amz-checksum-sha256`.
pub fn sha256_base64(bytes: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(bytes))
}

/// Reject payloads whose declared type is PNG but whose bytes are not.
pub fn check_payload(bytes: &[u8], content_type: &str) -> StorageResult<()> {
    if content_type.eq_ignore_ascii_case("image/png") && !is_png(bytes) {
        return Err(StorageError::invalid_image(
            "declared image/png but the PNG signature is missing",
        ));
    }
    Ok(())
}
