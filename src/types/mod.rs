//! Public types for the Casebook API.

mod audit;
mod case;
mod element;
mod feedback;
mod options;

pub use audit::{AuditBug, AuditCaseData, KeyPoint, split_sentences};
pub use case::CaseData;
pub use element::CoStarElement;
pub use feedback::{
    ElementFeedback, ElementScores, FeedbackStatus, MentorFeedback, PlayerPrompt, VerdictData,
};
pub use options::{OPTION_IDS, RectificationOption, normalize_options};
