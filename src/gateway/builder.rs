//! Builder for configuring Casebook instances

use std::sync::Arc;

use super::Casebook;
use crate::cache::CachePolicy;
use crate::providers::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::providers::{GeminiClient, RetryConfig, TextGenerator};
use crate::{CasebookError, Result};

/// Builder for configuring [`Casebook`] instances.
///
/// ```rust
/// # use casebook::Casebook;
/// let casebook = Casebook::builder().mock(true).build().unwrap();
/// assert!(casebook.is_mock());
/// ```
pub struct CasebookBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    gemini_key: Option<String>,
    gemini_base_url: Option<String>,
    model: String,
    mock: bool,
    policy: CachePolicy,
    retry: RetryConfig,
}

impl CasebookBuilder {
    pub fn new() -> Self {
        Self {
            generator: None,
            gemini_key: None,
            gemini_base_url: None,
            model: DEFAULT_MODEL.to_string(),
            mock: false,
            policy: CachePolicy::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Use a custom text generator. Takes precedence over [`gemini`](Self::gemini).
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Configure the Gemini API as the generator.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_key = Some(api_key.into());
        self
    }

    /// Override the Gemini base URL (proxies, tests).
    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = Some(url.into());
        self
    }

    /// Model ID passed to the generator (default: `gemini-3-flash-preview`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build artifacts locally instead of calling the generator.
    pub fn mock(mut self, enabled: bool) -> Self {
        self.mock = enabled;
        self
    }

    /// Set cache timings.
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set retry behaviour for failed generations.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build the orchestrator.
    ///
    /// Fails with [`CasebookError::NoGenerator`] when mock mode is off and
    /// no generator or Gemini key was configured.
    pub fn build(self) -> Result<Casebook> {
        let generator = match (self.generator, self.gemini_key) {
            (Some(generator), _) => Some(generator),
            (None, Some(key)) => {
                let base_url = self.gemini_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
                let client: Arc<dyn TextGenerator> =
                    Arc::new(GeminiClient::with_base_url(key, base_url)?);
                Some(client)
            }
            (None, None) => None,
        };

        if generator.is_none() && !self.mock {
            return Err(CasebookError::NoGenerator);
        }

        Ok(Casebook::new(
            generator,
            self.mock,
            self.model,
            self.policy,
            self.retry,
        ))
    }
}

impl Default for CasebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}
