//! S3 blob storage for posters and reels.
//!
//! This crate provides:
//! - The [`BlobStore`] abstraction with an S3 implementation
//! - Integrity-checked uploads (SHA-256, server-side encryption)
//! - Presigned URL generation
//! - Lenient base64 PNG decoding

pub mod blob;
pub mod client;
pub mod error;
pub mod operations;
pub mod png;

pub use blob::BlobStore;
pub use client::{S3BlobStore, S3Config};
pub use error::{StorageError, StorageResult};
pub use operations::{upload_bytes, upload_file, upload_png_base64};
pub use png::decode_png_base64;
