//! Multiple-choice rectification options.

use serde::{Deserialize, Serialize};

use crate::{CasebookError, Result};

/// Letters a valid option set uses, in display order.
pub const OPTION_IDS: [&str; 4] = ["A", "B", "C", "D"];

/// One candidate fix for a case's faulty prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectificationOption {
    /// Letter identifier, `A` through `D`.
    pub id: String,
    pub prompt_text: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Sort options by letter and check the set invariants.
///
/// A valid set has exactly four options, ids `A`–`D` (each once, after
/// trimming and upper-casing), and exactly one correct answer.
pub fn normalize_options(
    mut options: Vec<RectificationOption>,
) -> Result<Vec<RectificationOption>> {
    if options.len() != OPTION_IDS.len() {
        return Err(CasebookError::InvalidArtifact(format!(
            "expected {} options, got {}",
            OPTION_IDS.len(),
            options.len()
        )));
    }

    for option in &mut options {
        option.id = option.id.trim().to_ascii_uppercase();
    }
    options.sort_by(|a, b| a.id.cmp(&b.id));

    let ids: Vec<&str> = options.iter().map(|o| o.id.as_str()).collect();
    if ids != OPTION_IDS {
        return Err(CasebookError::InvalidArtifact(format!(
            "option ids must be A-D, got {ids:?}"
        )));
    }

    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err(CasebookError::InvalidArtifact(format!(
            "expected exactly one correct option, got {correct}"
        )));
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, is_correct: bool) -> RectificationOption {
        RectificationOption {
            id: id.to_string(),
            prompt_text: format!("prompt {id}"),
            is_correct,
            explanation: String::new(),
        }
    }

    #[test]
    fn sorts_by_letter() {
        let sorted = normalize_options(vec![
            option("C", false),
            option("a", false),
            option("D", true),
            option(" B", false),
        ])
        .unwrap();
        let ids: Vec<_> = sorted.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C", "D"]);
        assert!(sorted[3].is_correct);
    }

    #[test]
    fn rejects_wrong_count() {
        let err = normalize_options(vec![option("A", true), option("B", false)]).unwrap_err();
        assert!(err.to_string().contains("expected 4 options"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = normalize_options(vec![
            option("A", true),
            option("A", false),
            option("C", false),
            option("D", false),
        ])
        .unwrap_err();
        assert!(matches!(err, CasebookError::InvalidArtifact(_)));
    }

    #[test]
    fn rejects_multiple_correct() {
        let err = normalize_options(vec![
            option("A", true),
            option("B", true),
            option("C", false),
            option("D", false),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("exactly one correct"));
    }
}
