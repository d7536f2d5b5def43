//! Auditor-mode case.

use serde::{Deserialize, Serialize};

/// A summarised requirement of the original request, shown as a chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub emoji: String,
    pub label: String,
    pub value: String,
}

/// A wrong sentence in the AI output and why it is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditBug {
    pub id: String,
    /// The offending sentence, verbatim from `ai_output`.
    pub text: String,
    pub explanation: String,
}

/// An auditor-mode puzzle: a request, an AI answer containing mistakes, and
/// the list of mistakes to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCaseData {
    pub id: String,
    pub title: String,
    pub original_prompt: String,
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,
    pub ai_output: String,
    /// `ai_output` split into sentences. Always recomputed locally.
    #[serde(default)]
    pub sentences: Vec<String>,
    pub bugs: Vec<AuditBug>,
}

impl AuditCaseData {
    /// Recompute `sentences` from `ai_output`.
    pub fn with_sentences(mut self) -> Self {
        self.sentences = split_sentences(&self.ai_output);
        self
    }
}

/// Split text after `.`, `!` or `?` when followed by whitespace.
///
/// Terminators stay attached to their sentence; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(next_idx, next)) = chars.peek() else {
            break;
        };
        if next.is_whitespace() {
            push_trimmed(&mut sentences, &text[start..idx + ch.len_utf8()]);
            start = next_idx;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = split_sentences("We go Saturday. Bring jackets! Lunch by the pier? Yes.");
        assert_eq!(
            s,
            vec![
                "We go Saturday.",
                "Bring jackets!",
                "Lunch by the pier?",
                "Yes."
            ]
        );
    }

    #[test]
    fn keeps_decimals_and_abbreviations_without_space() {
        let s = split_sentences("It costs 3.50 dollars.  Next line\nhere.");
        assert_eq!(s, vec!["It costs 3.50 dollars.", "Next line\nhere."]);
    }

    #[test]
    fn drops_empty_pieces() {
        assert!(split_sentences("   ").is_empty());
        assert_eq!(split_sentences("No terminator"), vec!["No terminator"]);
    }
}
