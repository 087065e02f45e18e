//! Niche selection and fact cleanup.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};

/// Used when the model returns nothing.
pub const FALLBACK_FACT: &str = "Did you know?";

/// A generated fact and the niche it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub text: String,
    pub niche: String,
}

/// Trimmed, non-empty entries of a comma-separated niche list.
pub fn parse_niches(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Uniformly random niche from a comma-separated list.
pub fn pick_niche(csv: &str) -> AiResult<String> {
    parse_niches(csv)
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| AiError::InvalidInput("niche list is empty".to_string()))
}

/// Trim model output and drop one surrounding quote on each side.
pub fn clean_fact(raw: &str) -> String {
    let text = raw.trim();
    let text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\u{201C}'))
        .unwrap_or(text);
    let text = text
        .strip_suffix('"')
        .or_else(|| text.strip_suffix('\u{201D}'))
        .unwrap_or(text);

    if text.trim().is_empty() {
        FALLBACK_FACT.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_niches() {
        assert_eq!(
            parse_niches(" space , ,oceans,, ancient history "),
            vec!["space", "oceans", "ancient history"]
        );
        assert!(parse_niches(" , ").is_empty());
    }

    #[test]
    fn test_pick_niche_stays_in_list() {
        for _ in 0..50 {
            let niche = pick_niche("space, oceans").unwrap();
            assert!(niche == "space" || niche == "oceans");
        }
        assert_eq!(pick_niche("only one").unwrap(), "only one");
        assert!(matches!(pick_niche(""), Err(AiError::InvalidInput(_))));
    }

    #[test]
    fn test_clean_fact() {
        assert_eq!(clean_fact("  \"Sharks predate trees.\"  "), "Sharks predate trees.");
        assert_eq!(clean_fact("\u{201C}Curly quotes.\u{201D}"), "Curly quotes.");
        assert_eq!(clean_fact("\"\"double\"\""), "\"double\"");
        assert_eq!(clean_fact("No quotes"), "No quotes");
        assert_eq!(clean_fact("   "), FALLBACK_FACT);
        assert_eq!(clean_fact(""), FALLBACK_FACT);
    }
}
