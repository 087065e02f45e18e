//! Post kinds and clip combination modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What a scheduled run publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    /// Single photo post with the generated poster
    Post,
    /// Short vertical video built from the poster
    Reel,
}

impl PostKind {
    pub const ALL: &'static [PostKind] = &[PostKind::Post, PostKind::Reel];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Post => "post",
            PostKind::Reel => "reel",
        }
    }

    /// Parse a comma separated list, ignoring blanks and duplicates.
    pub fn parse_list(csv: &str) -> Result<Vec<PostKind>, PostKindParseError> {
        let mut kinds = Vec::new();
        for part in csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind: PostKind = part.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = PostKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" => Ok(PostKind::Post),
            "reel" => Ok(PostKind::Reel),
            _ => Err(PostKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown post kind: {0}")]
pub struct PostKindParseError(String);

/// How previously rendered reels are combined into one publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Publish every clip as one carousel item
    #[default]
    Carousel,
    /// Concatenate the clips into a single reel
    Reel,
}

impl CombineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombineMode::Carousel => "carousel",
            CombineMode::Reel => "reel",
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CombineMode {
    type Err = CombineModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "carousel" => Ok(CombineMode::Carousel),
            "reel" => Ok(CombineMode::Reel),
            _ => Err(CombineModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown combine mode: {0}")]
pub struct CombineModeParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let kinds = PostKind::parse_list("post, reel,post,").unwrap();
        assert_eq!(kinds, vec![PostKind::Post, PostKind::Reel]);

        assert!(PostKind::parse_list("story").is_err());
        assert!(PostKind::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_combine_mode_from_str() {
        assert_eq!("Reel".parse::<CombineMode>().unwrap(), CombineMode::Reel);
        assert_eq!(" carousel ".parse::<CombineMode>().unwrap(), CombineMode::Carousel);
        assert!("slideshow".parse::<CombineMode>().is_err());
        assert_eq!(CombineMode::default(), CombineMode::Carousel);
    }
}
