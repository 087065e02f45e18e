//! Content generation for the posting pipeline.
//!
//! This crate provides:
//! - Random niche selection from a configured list
//! - Fact, poster image and narration generation behind [`ContentGenerator`]
//! - The OpenAI client implementing it

pub mod client;
pub mod content;
pub mod error;
pub mod generator;
pub mod prompts;

pub use client::{OpenAiClient, OpenAiConfig};
pub use content::{clean_fact, pick_niche, Fact};
pub use error::{AiError, AiResult};
pub use generator::ContentGenerator;
pub use prompts::poster_prompt;
