//! Configuration loading for casebookd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.casebook/config.toml` (user)
//! 3. `/etc/casebook/config.toml` (system)
//!
//! When none of these exist, built-in defaults are used.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.casebook/secrets.toml` (user, must be 0600 or 0400)
//! 2. `/etc/casebook/secrets.toml` (system, must be 0600 or 0400)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CachePolicy;
use crate::providers::RetryConfig;
use crate::providers::gemini::DEFAULT_MODEL;
use crate::{CasebookError, Result};

/// Environment variable that forces mock generation when set to `1`.
pub const MOCK_ENV_VAR: &str = "MOCK_CASES";

/// Environment variables checked for the Gemini key, in order.
const GEMINI_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8787).
    #[serde(default = "default_address")]
    pub address: String,
    /// Per-request timeout in seconds (default: 120).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Serve `/debug/*` routes (default: false).
    #[serde(default)]
    pub debug_endpoints: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            request_timeout_secs: default_timeout(),
            debug_endpoints: false,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_address() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Model ID (default: gemini-3-flash-preview).
    #[serde(default = "default_model")]
    pub model: String,
    /// Build artifacts locally instead of calling Gemini.
    #[serde(default)]
    pub mock: bool,
    /// Delay between retries in milliseconds (default: 500).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Attempt cap. Unset retries forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Longest wait a `retry-after` hint may impose, in milliseconds.
    /// Unset keeps the fixed delay.
    #[serde(default)]
    pub max_retry_delay_ms: Option<u64>,
    /// Gemini API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            mock: false,
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: None,
            max_retry_delay_ms: None,
            base_url: None,
        }
    }
}

impl GenerationConfig {
    pub fn retry_config(&self) -> RetryConfig {
        let mut retry = RetryConfig::new().delay(Duration::from_millis(self.retry_delay_ms));
        if let Some(n) = self.max_attempts {
            retry = retry.max_attempts(n);
        }
        if let Some(ms) = self.max_retry_delay_ms {
            retry = retry.max_delay(Duration::from_millis(ms));
        }
        retry
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Cache timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Freshness TTL in seconds (default: 900).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Rate-limit window in seconds (default: 10).
    #[serde(default = "default_rate_limit_secs")]
    pub rate_limit_secs: u64,
    /// Sweep every N calls (default: 50).
    #[serde(default = "default_sweep_every")]
    pub sweep_every: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            rate_limit_secs: default_rate_limit_secs(),
            sweep_every: default_sweep_every(),
        }
    }
}

impl CacheConfig {
    pub fn policy(&self) -> CachePolicy {
        CachePolicy::new()
            .ttl(Duration::from_secs(self.ttl_secs))
            .rate_limit_window(Duration::from_secs(self.rate_limit_secs))
            .sweep_every(self.sweep_every)
    }
}

fn default_ttl_secs() -> u64 {
    900
}

fn default_rate_limit_secs() -> u64 {
    10
}

fn default_sweep_every() -> u64 {
    50
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; an error if missing)
    /// 2. `~/.casebook/config.toml`
    /// 3. `/etc/casebook/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CasebookError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            CasebookError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(CasebookError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".casebook").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/casebook/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply environment overrides. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if lookup(MOCK_ENV_VAR).as_deref() == Some("1") {
            self.generation.mock = true;
        }
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.casebook/secrets.toml` (if exists, must be 0600 or 0400)
    /// 2. `/etc/casebook/secrets.toml` (if exists, must be 0600 or 0400)
    ///
    /// Returns empty secrets if no file exists (the key may come from env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".casebook").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/casebook/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Check permissions on `path`, then parse it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            CasebookError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            CasebookError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            CasebookError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(CasebookError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Gemini key from the secrets file, falling back to `GEMINI_API_KEY`
    /// then `GOOGLE_API_KEY` via `lookup`.
    pub fn gemini_api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| {
                GEMINI_ENV_VARS
                    .iter()
                    .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:8787");
        assert_eq!(config.server.request_timeout_secs, 120);
        assert!(!config.server.debug_endpoints);
        assert_eq!(config.generation.model, "gemini-3-flash-preview");
        assert_eq!(config.generation.retry_config(), RetryConfig::default());
        assert_eq!(config.cache.policy(), CachePolicy::default());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8787"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8787");
        // Defaults preserved
        assert_eq!(config.cache.ttl_secs, 900);
        assert!(!config.generation.mock);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"
            request_timeout_secs = 30
            debug_endpoints = true

            [generation]
            model = "gemini-2.5-flash"
            mock = true
            retry_delay_ms = 250
            max_attempts = 4
            max_retry_delay_ms = 5000
            base_url = "http://localhost:1234/v1beta"

            [cache]
            ttl_secs = 60
            rate_limit_secs = 2
            sweep_every = 10
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.server.debug_endpoints);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(
            config.generation.retry_config(),
            RetryConfig::new()
                .delay(Duration::from_millis(250))
                .max_attempts(4)
                .max_delay(Duration::from_secs(5))
        );
        let policy = config.cache.policy();
        assert_eq!(policy.ttl, Duration::from_secs(60));
        assert_eq!(policy.max_idle, Duration::from_secs(120));
        assert_eq!(policy.rate_limit_window, Duration::from_secs(2));
        assert_eq!(policy.sweep_every, 10);
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [gemini]
            api_key = "gm-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.gemini_api_key(no_env), Some("gm-test-key".to_string()));
    }

    #[test]
    fn api_key_falls_back_to_env() {
        let secrets = Secrets::default();
        assert_eq!(secrets.gemini_api_key(no_env), None);

        let google_only = |k: &str| (k == "GOOGLE_API_KEY").then(|| "google".to_string());
        assert_eq!(secrets.gemini_api_key(google_only), Some("google".to_string()));

        let both = |k: &str| Some(k.to_lowercase());
        assert_eq!(
            secrets.gemini_api_key(both),
            Some("gemini_api_key".to_string())
        );
    }

    #[test]
    fn mock_env_forces_mock_mode() {
        let mut config = Config::default();
        config.apply_env(|k| (k == MOCK_ENV_VAR).then(|| "0".to_string()));
        assert!(!config.generation.mock);
        config.apply_env(|k| (k == MOCK_ENV_VAR).then(|| "1".to_string()));
        assert!(config.generation.mock);
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
