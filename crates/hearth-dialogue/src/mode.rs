//! Mode selection: decides between guided and bulk collection.
//!
//! Single-word phrases must be the whole reply. Multi-word phrases may
//! also appear inside a longer reply. A reply that hits both families is
//! ambiguous and selects nothing.

use std::sync::LazyLock;

use regex::Regex;

use hearth_core::types::DialogueMode;

const GUIDED_PHRASES: &[&str] = &[
    "one-by-one",
    "one by one",
    "one",
    "1",
    "guided",
    "guide me",
    "step by step",
    "step-by-step",
    "one at a time",
    "one question at a time",
];

const BULK_PHRASES: &[&str] = &[
    "all-at-once",
    "all at once",
    "all",
    "2",
    "bulk",
    "questionnaire",
    "give me all",
    "all the questions",
    "everything at once",
];

struct PhraseFamily {
    exact: Vec<String>,
    contained: Option<Regex>,
}

impl PhraseFamily {
    fn new(phrases: &[&str]) -> Self {
        let multi: Vec<String> = phrases
            .iter()
            .filter(|p| p.contains([' ', '-']))
            .map(|p| regex::escape(p))
            .collect();
        let contained = (!multi.is_empty()).then(|| {
            Regex::new(&format!(r"(?i)\b(?:{})\b", multi.join("|")))
                .expect("Invalid mode phrase regex")
        });
        Self {
            exact: phrases.iter().map(|p| p.to_string()).collect(),
            contained,
        }
    }

    fn matches(&self, folded: &str) -> bool {
        self.exact.iter().any(|p| p == folded)
            || self.contained.as_ref().is_some_and(|re| re.is_match(folded))
    }
}

static GUIDED: LazyLock<PhraseFamily> = LazyLock::new(|| PhraseFamily::new(GUIDED_PHRASES));
static BULK: LazyLock<PhraseFamily> = LazyLock::new(|| PhraseFamily::new(BULK_PHRASES));

/// Mode chosen by `text`, if it names exactly one.
pub fn select_mode(text: &str) -> Option<DialogueMode> {
    let folded = text
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase();
    if folded.is_empty() {
        return None;
    }
    match (GUIDED.matches(&folded), BULK.matches(&folded)) {
        (true, false) => Some(DialogueMode::Guided),
        (false, true) => Some(DialogueMode::Bulk),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_phrases() {
        assert_eq!(select_mode("one-by-one"), Some(DialogueMode::Guided));
        assert_eq!(select_mode("ONE"), Some(DialogueMode::Guided));
        assert_eq!(select_mode("guided"), Some(DialogueMode::Guided));
        assert_eq!(select_mode("all-at-once"), Some(DialogueMode::Bulk));
        assert_eq!(select_mode("All"), Some(DialogueMode::Bulk));
        assert_eq!(select_mode("questionnaire!"), Some(DialogueMode::Bulk));
    }

    #[test]
    fn test_phrase_inside_longer_reply() {
        assert_eq!(
            select_mode("Let's go one by one please"),
            Some(DialogueMode::Guided)
        );
        assert_eq!(
            select_mode("just give me all the questions"),
            Some(DialogueMode::Bulk)
        );
    }

    #[test]
    fn test_single_words_do_not_match_inside_sentences() {
        assert_eq!(select_mode("I want one focaccia"), None);
        assert_eq!(select_mode("that's all I know"), None);
    }

    #[test]
    fn test_ambiguous_reply_selects_nothing() {
        assert_eq!(select_mode("one by one or all at once?"), None);
    }

    #[test]
    fn test_unrelated_reply_selects_nothing() {
        assert_eq!(select_mode("hello there"), None);
        assert_eq!(select_mode(""), None);
    }
}
