//! Profile emoji validation for the `!emoji` DM command.

/// Validate and normalize a requested leaderboard emoji.
///
/// Accepts exactly one standard emoji grapheme; a trailing variation
/// selector (U+FE0F) is stripped before storage so `❤️` and `❤` store
/// identically. Returns `None` for anything that is not a single known
/// emoji (multiple emoji, trailing text, arbitrary strings).
pub fn normalize_profile_emoji(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let stripped = trimmed.trim_end_matches('\u{fe0f}');
    if stripped.is_empty() {
        return None;
    }

    // The registry stores some emoji only in fully-qualified form, so a
    // selector-stripped string may need the original to match.
    if emojis::get(stripped).is_some() || emojis::get(trimmed).is_some() {
        return Some(stripped.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_simple_emoji() {
        assert_eq!(normalize_profile_emoji("😀"), Some("😀".to_string()));
    }

    #[test]
    fn test_accepts_multi_codepoint_emoji() {
        assert_eq!(
            normalize_profile_emoji("🏳️‍🌈"),
            Some("🏳️‍🌈".trim_end_matches('\u{fe0f}').to_string())
        );
    }

    #[test]
    fn test_strips_variation_selector() {
        let stored = normalize_profile_emoji("❤️").unwrap();
        assert!(!stored.ends_with('\u{fe0f}'));
    }

    #[test]
    fn test_rejects_emoji_with_trailing_text() {
        assert_eq!(normalize_profile_emoji("🏳️‍🌈extra"), None);
    }

    #[test]
    fn test_rejects_multiple_emoji() {
        assert_eq!(normalize_profile_emoji("😀😀"), None);
    }

    #[test]
    fn test_rejects_plain_text() {
        assert_eq!(normalize_profile_emoji("hello"), None);
        assert_eq!(normalize_profile_emoji(""), None);
    }
}
