//! The seam between the orchestrator and the external model API.
//!
//! The orchestrator only needs "prompt in, text out". Everything else about
//! the model (auth, transport, response envelopes) stays behind
//! [`TextGenerator`], so tests can substitute a scripted double and the
//! daemon can plug in [`GeminiClient`](super::GeminiClient).
//!
//! # Error semantics
//!
//! Implementations return `Err` for transport or API failures. The caller
//! treats every error, and every completion it cannot parse, as transient
//! and retries.

use async_trait::async_trait;

use crate::Result;

/// Generates a text completion for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Produce a completion for `prompt` using `model`.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

