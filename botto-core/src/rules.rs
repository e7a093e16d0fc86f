//! Nomination validation rules and trigger detection.

use regex::Regex;

use crate::config::Settings;

/// Compiled trigger and validation patterns.
///
/// Triggers are matched from the start of the message; matching and
/// excluding rules search anywhere in the candidate text.
#[derive(Debug, Clone)]
pub struct RuleSet {
    matching: Vec<Regex>,
    excluding: Vec<Regex>,
    triggers: Vec<Regex>,
}

/// Pattern compilation errors, surfaced once at configuration load.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid {kind} pattern `{pattern}`: {source}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        source: regex::Error,
    },
}

fn compile_all(kind: &'static str, patterns: &[String]) -> Result<Vec<Regex>, RuleError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
                kind,
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn compile_trigger(pattern: &str) -> Result<Regex, RuleError> {
    // Triggers match from the start of the message
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| RuleError::InvalidPattern {
        kind: "trigger",
        pattern: pattern.to_string(),
        source,
    })
}

impl RuleSet {
    /// Compile the patterns configured in `settings`.
    pub fn compile(settings: &Settings) -> Result<Self, RuleError> {
        let triggers = settings
            .triggers
            .iter()
            .map(|p| compile_trigger(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            matching: compile_all("matching", &settings.rules.matching)?,
            excluding: compile_all("excluding", &settings.rules.excluding)?,
            triggers,
        })
    }

    /// Add the @-mention trigger for the bot's own user id.
    ///
    /// Called once the gateway knows its user id; mention triggering is
    /// configured per deployment.
    pub fn with_mention_trigger(mut self, bot_user_id: u64) -> Self {
        let pattern = format!(r"^<@!?\s?{bot_user_id}>");
        let mention = Regex::new(&pattern).expect("mention trigger pattern");
        self.triggers.insert(0, mention);
        self
    }

    /// Whether the message content starts with a nomination trigger.
    pub fn is_trigger(&self, content: &str) -> bool {
        self.triggers.iter().any(|t| t.is_match(content))
    }

    /// Whether a nominated message's content may become a motto.
    ///
    /// Valid iff every matching rule finds a match, no excluding rule
    /// matches, and the content is not itself a nomination trigger.
    pub fn is_valid_candidate(&self, content: &str) -> bool {
        self.matching.iter().all(|r| r.is_match(content))
            && !self.excluding.iter().any(|r| r.is_match(content))
            && !self.is_trigger(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn rule_set(matching: &[&str], excluding: &[&str], triggers: &[&str]) -> RuleSet {
        let mut settings = Settings::default();
        settings.rules.matching = matching.iter().map(|s| s.to_string()).collect();
        settings.rules.excluding = excluding.iter().map(|s| s.to_string()).collect();
        settings.triggers = triggers.iter().map(|s| s.to_string()).collect();
        RuleSet::compile(&settings).unwrap()
    }

    #[test]
    fn test_trigger_anchored_to_start() {
        let rules = rule_set(&[r"\S"], &[], &[r"!motto\b"]);
        assert!(rules.is_trigger("!motto"));
        assert!(rules.is_trigger("!motto please"));
        assert!(!rules.is_trigger("what a !motto"));
    }

    #[test]
    fn test_mention_trigger() {
        let rules = rule_set(&[r"\S"], &[], &[]).with_mention_trigger(42);
        assert!(rules.is_trigger("<@42> nice one"));
        assert!(rules.is_trigger("<@!42> nice one"));
        assert!(!rules.is_trigger("hey <@42>"));
        assert!(!rules.is_trigger("<@43>"));
    }

    #[test]
    fn test_excluding_beats_matching() {
        let rules = rule_set(&[r"\S"], &["forbidden"], &[]);
        assert!(rules.is_valid_candidate("a fine motto"));
        assert!(!rules.is_valid_candidate("a forbidden motto"));
    }

    #[test]
    fn test_all_matching_rules_required() {
        let rules = rule_set(&[r"\w{2,}", r"\s"], &[], &[]);
        assert!(rules.is_valid_candidate("two words"));
        assert!(!rules.is_valid_candidate("single"));
    }

    #[test]
    fn test_trigger_is_never_valid_candidate() {
        let rules = rule_set(&[r"\S"], &[], &[r"!motto\b"]);
        assert!(!rules.is_valid_candidate("!motto well done"));
        assert!(rules.is_valid_candidate("well done"));
    }

    #[test]
    fn test_bad_pattern_fails_compilation() {
        let mut settings = Settings::default();
        settings.rules.matching = vec!["(unclosed".to_string()];
        assert!(matches!(
            RuleSet::compile(&settings),
            Err(RuleError::InvalidPattern { kind: "matching", .. })
        ));
    }
}
