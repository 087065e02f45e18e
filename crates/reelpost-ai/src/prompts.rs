//! Prompt templates.

/// System prompt for the fact model.
pub const FACT_SYSTEM_PROMPT: &str = "\
You produce one quirky, accurate, 15-25 word fact in the given niche.
- Keep it family-friendly and brand-safe.
- Avoid sensitive/medical/financial claims.
- No hashtags or emojis.
- Return only the sentence.";

pub fn fact_user_prompt(niche: &str) -> String {
    format!("Niche: {}. Generate the fact.", niche)
}

/// Square poster with the fact overlaid as readable text.
pub fn poster_prompt(fact: &str, niche: &str) -> String {
    format!(
        "Design a clean, square poster for Instagram about \"{niche}\".\n\
         Prominently overlay this exact text centered with good contrast and large, readable typography:\n\
         \n\
         \"{fact}\"\n\
         \n\
         Use a simple, modern color palette. Include subtle, relevant illustration/background that fits the topic.\n\
         Do not include watermarks or logos."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_prompt_embeds_fact_and_niche() {
        let prompt = poster_prompt("Honey never spoils.", "food science");
        assert!(prompt.contains("about \"food science\""));
        assert!(prompt.contains("\"Honey never spoils.\""));
        assert!(prompt.contains("watermarks"));
    }
}
