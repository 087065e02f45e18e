#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for reel assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Stream probing through `ffprobe`
//! - Still image to vertical reel rendering
//! - Multi-clip concatenation with stream copy when the inputs allow it

pub mod assembler;
pub mod command;
pub mod compat;
pub mod concat;
pub mod error;
pub mod probe;
pub mod reel;
pub mod workdir;

pub use assembler::VideoAssembler;
pub use command::{check_ffmpeg, check_ffprobe, EncodeRunner, FfmpegCommand, FfmpegRunner};
pub use compat::{classify, CompatibilityVerdict};
pub use concat::{plan_concat, AssemblyJob, Strategy};
pub use error::{MediaError, MediaResult};
pub use probe::{FfprobeInspector, MediaProbe, ProbeInspector};
pub use workdir::WorkDir;
