//! Casebook - cached artifact generation for the game

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use super::builder::CasebookBuilder;
use crate::cache::{
    CacheEntry, CachePolicy, OptionSet, OptionsStore, SessionSlot, SessionStore, Sweeper,
    options_key, session_key,
};
use crate::prompts::{self, CaseRequest};
use crate::providers::{RetryConfig, TextGenerator, with_retry};
use crate::types::{
    AuditCaseData, CaseData, MentorFeedback, PlayerPrompt, RectificationOption, VerdictData,
};
use crate::{CaseGateway, CaseRequestOptions, CasebookError, Result, convert, mock, telemetry};

/// A session-cached artifact: how to ask for it, parse it, and fake it.
trait SessionArtifact: SessionSlot {
    fn request<R: Rng + ?Sized>(rng: &mut R) -> CaseRequest;
    fn parse(text: &str) -> Result<Self>;
    fn mock<R: Rng + ?Sized>(rng: &mut R) -> Self;
    fn id(&self) -> &str;
}

impl SessionArtifact for CaseData {
    fn request<R: Rng + ?Sized>(rng: &mut R) -> CaseRequest {
        prompts::case_request(rng)
    }

    fn parse(text: &str) -> Result<Self> {
        convert::parse_case(text)
    }

    fn mock<R: Rng + ?Sized>(rng: &mut R) -> Self {
        mock::case(rng)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl SessionArtifact for AuditCaseData {
    fn request<R: Rng + ?Sized>(rng: &mut R) -> CaseRequest {
        prompts::audit_request(rng)
    }

    fn parse(text: &str) -> Result<Self> {
        convert::parse_audit_case(text)
    }

    fn mock<R: Rng + ?Sized>(rng: &mut R) -> Self {
        mock::audit_case(rng)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generation orchestrator.
///
/// Owns the session and options stores and the sweep counter, so one
/// instance (shared behind an `Arc`) is the whole process's cache. Built
/// with [`Casebook::builder`].
pub struct Casebook {
    generator: Option<Arc<dyn TextGenerator>>,
    mock: bool,
    model: String,
    policy: CachePolicy,
    retry: RetryConfig,
    sessions: SessionStore,
    options: OptionsStore,
    sweeper: Sweeper,
}

impl std::fmt::Debug for Casebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Casebook")
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .field("mock", &self.mock)
            .field("model", &self.model)
            .field("policy", &self.policy)
            .field("sessions", &self.sessions.len())
            .field("options", &self.options.len())
            .finish()
    }
}

impl Casebook {
    /// Create a new builder.
    pub fn builder() -> CasebookBuilder {
        CasebookBuilder::new()
    }

    pub(crate) fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        mock: bool,
        model: String,
        policy: CachePolicy,
        retry: RetryConfig,
    ) -> Self {
        Self {
            generator,
            mock,
            model,
            sweeper: Sweeper::new(policy.sweep_every),
            policy,
            retry,
            sessions: SessionStore::new(),
            options: OptionsStore::new(),
        }
    }

    /// Session store (for inspection and tests).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Options store (for inspection and tests).
    pub fn options_store(&self) -> &OptionsStore {
        &self.options
    }

    /// Sweep counter.
    pub fn sweeper(&self) -> &Sweeper {
        &self.sweeper
    }

    /// Cache timings in effect.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Model ID passed to the generator.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether artifacts are built locally instead of generated.
    pub fn is_mock(&self) -> bool {
        self.mock
    }

    fn maybe_sweep(&self, now: DateTime<Utc>) {
        self.sweeper
            .maybe_sweep(&self.sessions, &self.options, now, self.policy.max_idle);
    }

    /// Clone of the cached `T` for `key` if the policy allows serving it.
    /// Touches the entry on a hit.
    fn serve_from_session<T: SessionSlot>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let mut bundle = self.sessions.get_or_create(key);
        let entry = T::slot_mut(&mut bundle).as_mut()?;
        if !self.policy.can_serve(entry, now) {
            return None;
        }
        entry.touch(now);
        Some(entry.data.clone())
    }

    fn serve_options(&self, key: &str, now: DateTime<Utc>) -> Option<OptionSet> {
        let mut entry = self.options.get_mut(key)?;
        if !self.policy.can_serve(&entry, now) {
            return None;
        }
        entry.touch(now);
        Some(entry.data.clone())
    }

    async fn session_artifact<T: SessionArtifact>(
        &self,
        session_id: Option<&str>,
        options: CaseRequestOptions,
    ) -> Result<T> {
        let now = Utc::now();
        self.maybe_sweep(now);
        let key = session_key(session_id);

        if !options.force_new
            && let Some(data) = self.serve_from_session::<T>(key, now)
        {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "artifact" => T::ARTIFACT).increment(1);
            debug!(artifact = T::ARTIFACT, session = key, id = data.id(), "cache hit");
            return Ok(data);
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "artifact" => T::ARTIFACT).increment(1);
        debug!(
            artifact = T::ARTIFACT,
            session = key,
            force_new = options.force_new,
            "cache miss"
        );

        let data = if self.mock {
            mock_artifact(T::ARTIFACT, |rng| T::mock(rng))
        } else {
            let request = T::request(&mut rand::thread_rng());
            debug!(
                artifact = T::ARTIFACT,
                scenario = request.scenario,
                element = request.element.map(|e| e.as_str()),
                case_number = request.case_number,
                "requesting generation"
            );
            self.generate_live(T::ARTIFACT, &request.prompt, T::parse)
                .await?
        };

        self.sessions
            .put(key, CacheEntry::new(data.clone(), Utc::now()));
        info!(artifact = T::ARTIFACT, session = key, id = data.id(), "artifact generated");
        Ok(data)
    }

    /// Call the generator through the retry loop and record timing.
    async fn generate_live<T>(
        &self,
        artifact: &'static str,
        prompt: &str,
        parse: fn(&str) -> Result<T>,
    ) -> Result<T> {
        let generator = self
            .generator
            .as_deref()
            .ok_or(CasebookError::NoGenerator)?;
        let model = self.model.as_str();

        let started = Instant::now();
        let result = with_retry(&self.retry, artifact, || async move {
            let text = generator.generate(model, prompt).await?;
            parse(&text)
        })
        .await;

        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS, "artifact" => artifact)
            .record(started.elapsed().as_secs_f64());
        if result.is_ok() {
            metrics::counter!(telemetry::GENERATIONS_TOTAL,
                "artifact" => artifact,
                "source" => "live",
            )
            .increment(1);
        }
        result
    }
}

fn mock_artifact<T>(
    artifact: &'static str,
    build: impl FnOnce(&mut rand::rngs::ThreadRng) -> T,
) -> T {
    metrics::counter!(telemetry::GENERATIONS_TOTAL,
        "artifact" => artifact,
        "source" => "mock",
    )
    .increment(1);
    build(&mut rand::thread_rng())
}

#[async_trait]
impl CaseGateway for Casebook {
    async fn generate_case(
        &self,
        session_id: Option<&str>,
        options: CaseRequestOptions,
    ) -> Result<CaseData> {
        self.session_artifact(session_id, options).await
    }

    async fn generate_audit_case(
        &self,
        session_id: Option<&str>,
        options: CaseRequestOptions,
    ) -> Result<AuditCaseData> {
        self.session_artifact(session_id, options).await
    }

    async fn generate_rectification_options(
        &self,
        case: &CaseData,
        session_id: Option<&str>,
    ) -> Result<Vec<RectificationOption>> {
        const ARTIFACT: &str = "options";

        let now = Utc::now();
        self.maybe_sweep(now);
        let session = session_key(session_id);
        let key = options_key(session, case);

        if let Some(options) = self.serve_options(&key, now) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "artifact" => ARTIFACT).increment(1);
            debug!(artifact = ARTIFACT, session, case_id = %case.id, "cache hit");
            return Ok(options);
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "artifact" => ARTIFACT).increment(1);
        debug!(artifact = ARTIFACT, session, case_id = %case.id, "cache miss");

        let options = if self.mock {
            mock_artifact(ARTIFACT, |rng| mock::options(case, rng))
        } else {
            let prompt = prompts::options_prompt(case);
            self.generate_live(ARTIFACT, &prompt, convert::parse_options)
                .await?
        };

        self.options
            .set(key, CacheEntry::new(options.clone(), Utc::now()));
        info!(artifact = ARTIFACT, session, case_id = %case.id, "artifact generated");
        Ok(options)
    }

    async fn mentor_feedback(&self, prompt_text: &str) -> Result<MentorFeedback> {
        const ARTIFACT: &str = "mentor";

        if self.mock {
            return Ok(mock_artifact(ARTIFACT, |_| mock::mentor_feedback(prompt_text)));
        }
        let prompt = prompts::mentor_prompt(prompt_text);
        self.generate_live(ARTIFACT, &prompt, convert::parse_mentor_feedback)
            .await
    }

    async fn evaluate_rectification(
        &self,
        case: &CaseData,
        player_prompt: &PlayerPrompt,
    ) -> Result<VerdictData> {
        const ARTIFACT: &str = "verdict";

        if self.mock {
            return Ok(mock_artifact(ARTIFACT, |_| {
                mock::verdict(case, player_prompt)
            }));
        }
        let prompt = prompts::evaluation_prompt(case, player_prompt);
        let verdict = self
            .generate_live(ARTIFACT, &prompt, convert::parse_verdict)
            .await?;
        info!(
            case_id = %case.id,
            success = verdict.success,
            score = verdict.overall_score,
            "rectification evaluated"
        );
        Ok(verdict)
    }
}
