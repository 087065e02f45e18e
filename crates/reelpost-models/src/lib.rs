//! Shared data models for the reelpost pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Media items handed to the publishing flows
//! - Post kinds and clip combination modes
//! - The reel encoding profile shared by every FFmpeg invocation

pub mod encoding;
pub mod media;
pub mod post;

// Re-export common types
pub use encoding::ReelSettings;
pub use media::{MediaItem, MediaKind};
pub use post::{CombineMode, CombineModeParseError, PostKind, PostKindParseError};
