//! Message text normalization.
//!
//! Two distinct transforms with different consumers:
//!
//! - [`clean_text`] produces the *stored* form of a motto: platform
//!   channel-mention and custom-emoji tokens are rewritten into readable
//!   shorthand, case and punctuation are left untouched.
//! - [`strict_normalize`] produces the *comparison* form used only by the
//!   duplicate detector: lower-cased, punctuation stripped, whitespace
//!   collapsed. Never displayed or stored as the motto text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<#(\d+)>").expect("channel mention pattern"));

static CUSTOM_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a?:(\w+):\d+>").expect("custom emoji pattern"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("non-word pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Rewrite platform tokens into the form a motto is stored and displayed in.
///
/// `<#123>` becomes `#channel-name` when the id is present in
/// `channel_names` (unresolvable mentions are left as-is), and custom
/// emoji tokens `<:party:456>` / `<a:party:456>` become `:party:`.
pub fn clean_text(raw: &str, channel_names: &HashMap<u64, String>) -> String {
    let with_channels = CHANNEL_MENTION.replace_all(raw, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<u64>()
            .ok()
            .and_then(|id| channel_names.get(&id))
            .map_or_else(|| caps[0].to_string(), |name| format!("#{name}"))
    });

    CUSTOM_EMOJI.replace_all(&with_channels, ":$1:").into_owned()
}

/// Channel ids mentioned as `<#id>` tokens in the text.
///
/// The transport layer resolves these to names before [`clean_text`].
pub fn channel_mention_ids(text: &str) -> Vec<u64> {
    CHANNEL_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .filter(|id| *id != 0)
        .collect()
}

/// The comparison-only form: lower-cased, non-word/non-space characters
/// stripped, whitespace runs collapsed to a single space, ends trimmed.
///
/// Idempotent: `strict_normalize(strict_normalize(x)) == strict_normalize(x)`.
pub fn strict_normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> HashMap<u64, String> {
        HashMap::from([(1234, "general".to_string()), (5678, "mottos".to_string())])
    }

    #[test]
    fn test_clean_text_channel_mentions() {
        let cleaned = clean_text("see <#1234> and <#5678>!", &channels());
        assert_eq!(cleaned, "see #general and #mottos!");
    }

    #[test]
    fn test_clean_text_unknown_channel_left_alone() {
        let cleaned = clean_text("see <#999>", &channels());
        assert_eq!(cleaned, "see <#999>");
    }

    #[test]
    fn test_clean_text_custom_emoji() {
        let cleaned = clean_text("nice <:party:111> and <a:blob:222>", &HashMap::new());
        assert_eq!(cleaned, "nice :party: and :blob:");
    }

    #[test]
    fn test_clean_text_preserves_case_and_punctuation() {
        let cleaned = clean_text("It's GREAT, isn't it?", &HashMap::new());
        assert_eq!(cleaned, "It's GREAT, isn't it?");
    }

    #[test]
    fn test_strict_normalize() {
        assert_eq!(
            strict_normalize("  It's GREAT,   isn't it? "),
            "its great isnt it"
        );
    }

    #[test]
    fn test_strict_normalize_idempotent() {
        for input in [
            "Hello, World!",
            "  spaced   out\ttabs\nand lines  ",
            "ALL CAPS!!!",
            "já normalizado",
            "",
        ] {
            let once = strict_normalize(input);
            assert_eq!(strict_normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_strict_normalize_equates_variants() {
        let a = strict_normalize("Stay hungry, stay foolish.");
        let b = strict_normalize("stay HUNGRY   stay foolish");
        assert_eq!(a, b);
    }
}
