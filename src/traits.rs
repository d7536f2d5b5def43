//! Core CaseGateway trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{
    AuditCaseData, CaseData, MentorFeedback, PlayerPrompt, RectificationOption, VerdictData,
};

/// Per-request switches for case generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRequestOptions {
    /// Skip the cache and always generate.
    #[serde(default)]
    pub force_new: bool,
}

impl CaseRequestOptions {
    /// Options that bypass the cache.
    pub fn force_new() -> Self {
        Self { force_new: true }
    }
}

/// Everything the game asks of the backend.
///
/// The session-scoped operations are cached per session id (`None` or an
/// empty id is the shared anonymous session). Mentor feedback and verdict
/// evaluation are stateless.
#[async_trait]
pub trait CaseGateway: Send + Sync {
    /// Detective case for a session.
    async fn generate_case(
        &self,
        session_id: Option<&str>,
        options: CaseRequestOptions,
    ) -> Result<CaseData>;

    /// Auditor case for a session.
    async fn generate_audit_case(
        &self,
        session_id: Option<&str>,
        options: CaseRequestOptions,
    ) -> Result<AuditCaseData>;

    /// Four candidate fixes for `case`, sorted `A`–`D` with exactly one correct.
    async fn generate_rectification_options(
        &self,
        case: &CaseData,
        session_id: Option<&str>,
    ) -> Result<Vec<RectificationOption>>;

    /// Review of a free-form sandbox prompt.
    async fn mentor_feedback(&self, prompt_text: &str) -> Result<MentorFeedback>;

    /// Score a player's CO-STAR fix for `case`.
    async fn evaluate_rectification(
        &self,
        case: &CaseData,
        player_prompt: &PlayerPrompt,
    ) -> Result<VerdictData>;
}
