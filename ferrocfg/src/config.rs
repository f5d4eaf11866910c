//! Parser and collaborator configuration.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ServiceError;
use crate::parser::DEFAULT_QUALITY_THRESHOLD;
use crate::rules::DEFAULT_RULE_VERSION;

/// Parser configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Rules directory; documents live under `<rules_dir>/parsers/`.
    pub rules_dir: PathBuf,

    /// Minimum quality score for a valid extraction.
    pub quality_threshold: f64,

    /// Version stamped on generated rule sets.
    pub rule_version: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("rules"),
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            rule_version: DEFAULT_RULE_VERSION.to_string(),
        }
    }
}

/// Hosted extraction service configuration.
pub struct ServiceConfig {
    /// API key. Never printed.
    pub api_key: SecretString,

    /// Base URL of the service, with trailing slash.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Response token limit.
    pub max_tokens: u32,

    /// Per-call timeout.
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Default base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://open.bigmodel.cn/api/paas/v4/";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "glm-4-plus";

    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 8000,
            timeout: Duration::from_secs(60),
        }
    }

    /// Load from `FERROCFG_API_KEY`, `FERROCFG_BASE_URL` and `FERROCFG_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::new(env::var("FERROCFG_API_KEY").unwrap_or_default());
        if let Ok(base_url) = env::var("FERROCFG_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("FERROCFG_MODEL") {
            config.model = model;
        }
        config
    }

    /// Chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}chat/completions", self.base_url)
    }

    /// Fail if no API key is set.
    pub fn ensure_configured(&self) -> Result<(), ServiceError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ServiceError::NotConfigured {
                message: "API key is not set (FERROCFG_API_KEY)".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"****")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}
