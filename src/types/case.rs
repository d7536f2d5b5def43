//! Detective-mode case.

use serde::{Deserialize, Serialize};

use super::CoStarElement;

/// A detective-mode puzzle: a prompt missing one CO-STAR element, the funny
/// output it produced, and the fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    /// Three-digit case number, as a string.
    pub id: String,
    pub title: String,
    pub backstory: String,
    pub faulty_prompt: String,
    pub faulty_output: String,
    pub botched_element: CoStarElement,
    /// Explanation quoting both the prompt and the output.
    pub botched_explanation: String,
    pub ideal_prompt: String,
}
