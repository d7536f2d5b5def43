//! Sandbox-mode mentor feedback and detective-mode verdicts.

use serde::{Deserialize, Serialize};

/// How well a prompt covers one CO-STAR element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Missing,
    Partial,
    Complete,
}

/// Mentor comment on a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFeedback {
    /// Element label as the mentor wrote it (e.g. "Context").
    pub element: String,
    pub status: FeedbackStatus,
    pub comment: String,
}

/// Mentor review of a free-form prompt written in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorFeedback {
    pub feedback: Vec<ElementFeedback>,
    pub overall_assessment: String,
    pub is_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_prompt: Option<String>,
}

/// The player's CO-STAR breakdown of a fixed prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPrompt {
    pub context: String,
    pub objective: String,
    pub style: String,
    pub tone: String,
    pub audience: String,
    pub response: String,
}

impl PlayerPrompt {
    /// Field value for an element.
    pub fn field(&self, element: super::CoStarElement) -> &str {
        use super::CoStarElement::*;
        match element {
            Context => &self.context,
            Objective => &self.objective,
            Style => &self.style,
            Tone => &self.tone,
            Audience => &self.audience,
            Response => &self.response,
        }
    }
}

/// Per-element scores, 0–100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementScores {
    pub context: u32,
    pub objective: u32,
    pub style: u32,
    pub tone: u32,
    pub audience: u32,
    pub response: u32,
}

/// Outcome of scoring a player's rectified prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictData {
    pub success: bool,
    pub overall_score: u32,
    pub element_scores: ElementScores,
    /// What the model produces for the player's prompt.
    pub new_output: String,
    pub case_summary: String,
}
