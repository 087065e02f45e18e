//! Upload helpers returning presigned URLs.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::blob::{check_payload, BlobStore};
use crate::error::StorageResult;
use crate::png::decode_png_base64;

/// Upload bytes and return a presigned GET URL for them.
pub async fn upload_bytes(
    store: &dyn BlobStore,
    bytes: Vec<u8>,
    key: &str,
    content_type: &str,
    ttl: Duration,
) -> StorageResult<String> {
    check_payload(&bytes, content_type)?;
    store.put(bytes, key, content_type).await?;
    store.presigned_get(key, ttl).await
}

/// Decode a base64 PNG, upload it and return a presigned URL.
pub async fn upload_png_base64(
    store: &dyn BlobStore,
    b64: &str,
    key: &str,
    ttl: Duration,
) -> StorageResult<String> {
    let bytes = decode_png_base64(b64)?;
    info!("Uploading PNG poster ({} bytes) to {}", bytes.len(), key);
    upload_bytes(store, bytes, key, "image/png", ttl).await
}

/// Upload a local file and return a presigned URL.
pub async fn upload_file(
    store: &dyn BlobStore,
    path: impl AsRef<Path>,
    key: &str,
    content_type: &str,
    ttl: Duration,
) -> StorageResult<String> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    info!("Uploading {} ({} bytes) to {}", path.display(), bytes.len(), key);
    upload_bytes(store, bytes, key, content_type, ttl).await
}
