//! Turning raw model completions into typed artifacts.
//!
//! The generator is asked for a single JSON object but frequently wraps it in
//! prose or code fences. Every parser here first cuts the object out with
//! [`extract_json_object`], then deserializes and validates. Any failure is
//! reported as a malformed-output error, which the retry loop treats as one
//! failed attempt.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{
    AuditCaseData, CaseData, MentorFeedback, RectificationOption, VerdictData, normalize_options,
};
use crate::{CasebookError, Result};

/// The text from the first `{` to the last `}`, inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = extract_json_object(text).ok_or(CasebookError::MissingJson)?;
    Ok(serde_json::from_str(json)?)
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CasebookError::InvalidArtifact(format!("{field} is empty")));
    }
    Ok(())
}

/// Parse a detective case.
///
/// `botchedElement` is matched case-insensitively, since models often
/// capitalise it.
pub fn parse_case(text: &str) -> Result<CaseData> {
    let mut value: Value = parse_object(text)?;
    if let Some(element) = value.get_mut("botchedElement")
        && let Some(tag) = element.as_str()
    {
        *element = Value::String(tag.trim().to_ascii_lowercase());
    }

    let case: CaseData = serde_json::from_value(value)?;
    require_non_empty("id", &case.id)?;
    require_non_empty("faultyPrompt", &case.faulty_prompt)?;
    require_non_empty("idealPrompt", &case.ideal_prompt)?;
    Ok(case)
}

/// Parse an audit case and derive its sentence list from `aiOutput`.
pub fn parse_audit_case(text: &str) -> Result<AuditCaseData> {
    let case: AuditCaseData = parse_object(text)?;
    require_non_empty("aiOutput", &case.ai_output)?;
    if case.bugs.is_empty() {
        return Err(CasebookError::InvalidArtifact("audit case has no bugs".into()));
    }
    Ok(case.with_sentences())
}

#[derive(Deserialize)]
struct OptionsEnvelope {
    options: Vec<RectificationOption>,
}

/// Parse `{"options": [...]}` into a sorted, validated option set.
pub fn parse_options(text: &str) -> Result<Vec<RectificationOption>> {
    let envelope: OptionsEnvelope = parse_object(text)?;
    normalize_options(envelope.options)
}

/// Parse sandbox mentor feedback.
pub fn parse_mentor_feedback(text: &str) -> Result<MentorFeedback> {
    let feedback: MentorFeedback = parse_object(text)?;
    if feedback.feedback.is_empty() {
        return Err(CasebookError::InvalidArtifact(
            "mentor feedback has no element comments".into(),
        ));
    }
    Ok(feedback)
}

/// Parse a verdict. Scores above 100 are clamped.
pub fn parse_verdict(text: &str) -> Result<VerdictData> {
    let mut verdict: VerdictData = parse_object(text)?;
    verdict.overall_score = verdict.overall_score.min(100);
    let scores = &mut verdict.element_scores;
    for score in [
        &mut scores.context,
        &mut scores.objective,
        &mut scores.style,
        &mut scores.tone,
        &mut scores.audience,
        &mut scores.response,
    ] {
        *score = (*score).min(100);
    }
    Ok(verdict)
}
