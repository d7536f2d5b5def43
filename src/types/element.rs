//! The six CO-STAR prompt elements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CasebookError;

/// One of the six CO-STAR elements a prompt is judged on.
///
/// Serialized lowercase (`"tone"`), which is also the tag the generator is
/// asked to emit for `botchedElement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoStarElement {
    /// Background or setting the model needs.
    Context,
    /// The task to accomplish.
    Objective,
    /// Writing format (formal, bullet points, ...).
    Style,
    /// Emotional register (friendly, serious, ...).
    Tone,
    /// Who the output is for.
    Audience,
    /// Expected shape or length of the output.
    Response,
}

impl CoStarElement {
    /// All elements in framework order.
    pub const ALL: [CoStarElement; 6] = [
        CoStarElement::Context,
        CoStarElement::Objective,
        CoStarElement::Style,
        CoStarElement::Tone,
        CoStarElement::Audience,
        CoStarElement::Response,
    ];

    /// Lowercase wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoStarElement::Context => "context",
            CoStarElement::Objective => "objective",
            CoStarElement::Style => "style",
            CoStarElement::Tone => "tone",
            CoStarElement::Audience => "audience",
            CoStarElement::Response => "response",
        }
    }

    /// Capitalised label used in player-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            CoStarElement::Context => "Context",
            CoStarElement::Objective => "Objective",
            CoStarElement::Style => "Style",
            CoStarElement::Tone => "Tone",
            CoStarElement::Audience => "Audience",
            CoStarElement::Response => "Response",
        }
    }
}

impl fmt::Display for CoStarElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoStarElement {
    type Err = CasebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoStarElement::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CasebookError::InvalidArtifact(format!("unknown CO-STAR element: {s}")))
    }
}
