//! HTTP daemon support.
//!
//! This module provides:
//! - Configuration and secrets loading (`config`)
//! - The axum router and handlers (`routes`)
//! - [`build_casebook`], wiring a [`Config`](config::Config) into a [`Casebook`]

pub mod config;
pub mod routes;

pub use routes::{AppState, router};

use tracing::info;

use crate::{Casebook, Result};
use config::Config;

/// Build a [`Casebook`] from configuration.
///
/// Live mode requires `api_key`; mock mode ignores it.
pub fn build_casebook(config: &Config, api_key: Option<String>) -> Result<Casebook> {
    let generation = &config.generation;
    let mut builder = Casebook::builder()
        .model(&generation.model)
        .mock(generation.mock)
        .cache_policy(config.cache.policy())
        .retry(generation.retry_config());

    if !generation.mock
        && let Some(key) = api_key
    {
        builder = builder.gemini(key);
        if let Some(ref url) = generation.base_url {
            builder = builder.gemini_base_url(url);
        }
    }

    let casebook = builder.build()?;
    info!(
        model = casebook.model(),
        mock = casebook.is_mock(),
        ttl_secs = config.cache.ttl_secs,
        "casebook ready"
    );
    Ok(casebook)
}
