//! Keyword tag derivation from free-text prompts

/// Words too common to be useful as tags
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Maximum number of tags derived from a single prompt
const MAX_TAGS: usize = 5;

/// Derive a small set of keyword tags from a prompt.
///
/// Lowercases, strips punctuation, splits on whitespace, drops stop words and
/// tokens of length <= 2, keeps at most the first five remaining tokens, and
/// removes duplicates while preserving first-seen order.
pub fn extract_tags(prompt: &str) -> Vec<String> {
    let cleaned: String = prompt
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tags: Vec<String> = Vec::new();
    for word in cleaned
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .take(MAX_TAGS)
    {
        if !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let prompt = "A cozy living room with warm lighting";
        assert_eq!(extract_tags(prompt), extract_tags(prompt));
    }

    #[test]
    fn test_strips_stop_words_and_short_tokens() {
        let tags = extract_tags("on a table in the sun by an oak");
        assert!(!tags.iter().any(|t| STOP_WORDS.contains(&t.as_str())));
        assert!(tags.iter().all(|t| t.len() > 2));
        assert_eq!(tags, vec!["table", "sun", "oak"]);
    }

    #[test]
    fn test_caps_at_five() {
        let tags = extract_tags("sunset beach palm trees golden sand ocean waves breeze");
        assert_eq!(tags.len(), 5);
        assert_eq!(tags, vec!["sunset", "beach", "palm", "trees", "golden"]);
    }

    #[test]
    fn test_deduplicates() {
        let tags = extract_tags("beach beach beach sand");
        assert_eq!(tags, vec!["beach", "sand"]);
    }

    #[test]
    fn test_strips_punctuation() {
        let tags = extract_tags("Modern kitchen, marble counters!");
        assert_eq!(tags, vec!["modern", "kitchen", "marble", "counters"]);
    }

    #[test]
    fn test_empty_prompt() {
        assert!(extract_tags("").is_empty());
        assert!(extract_tags("a an on").is_empty());
    }
}
