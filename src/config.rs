//! Configuration for summary requests.
//!
//! All request behaviour is controlled through [`SummaryConfig`], built via
//! its [`SummaryConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the one-shot entry points and an
//! interactive session, and to see in one place what a run was asked to do.
//!
//! The service credential is the only environment-driven setting: it is read
//! once at startup by [`SummaryConfig::from_env`], and its absence is a
//! fatal startup condition rather than a runtime error.

use crate::client::SummaryService;
use crate::error::SumflowError;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the service credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default service endpoint (base URL, no trailing slash).
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_OUTPUT_TOKENS: usize = 2048;

/// Configuration for the summary pipeline.
///
/// Built via [`SummaryConfig::builder()`] or [`SummaryConfig::from_env()`].
///
/// # Example
/// ```rust
/// use sumflow::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .api_key("test-key")
///     .model("gemini-2.5-flash")
///     .temperature(0.1)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Service credential sent with every request. Required unless a
    /// pre-built [`Self::service`] is supplied.
    pub api_key: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Service base URL. Default: [`DEFAULT_ENDPOINT`]. Override for
    /// proxies or self-hosted gateways.
    pub endpoint: String,

    /// Sampling temperature. Range 0.0–2.0. Default: 0.2.
    ///
    /// Low temperature keeps the summary faithful to the source text and the
    /// diagram syntactically conservative. Raise it only if the bullets come
    /// out too extractive.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2048.
    ///
    /// The response carries both the summary and the diagram source; setting
    /// this too low truncates the JSON payload mid-string, which surfaces as
    /// a service failure rather than a partial result.
    pub max_output_tokens: usize,

    /// Custom instruction template with an optional `{input}` placeholder.
    /// If `None`, uses [`crate::prompts::DEFAULT_PROMPT_TEMPLATE`].
    pub prompt_template: Option<String>,

    /// Pre-built service implementation. Takes precedence over `api_key`;
    /// used by tests and by callers wrapping the service with middleware.
    pub service: Option<Arc<dyn SummaryService>>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            prompt_template: None,
            service: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field(
                "api_key",
                &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("prompt_template", &self.prompt_template.as_ref().map(|_| "<custom>"))
            .field("service", &self.service.as_ref().map(|_| "<dyn SummaryService>"))
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config with the credential read from [`API_KEY_ENV`].
    ///
    /// # Errors
    /// [`SumflowError::ApiKeyMissing`] when the variable is unset or blank.
    pub fn from_env() -> Result<Self, SumflowError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SumflowError::ApiKeyMissing)?;
        Self::builder().api_key(key).build()
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn service(mut self, service: Arc<dyn SummaryService>) -> Self {
        self.config.service = Some(service);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SumflowError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(SumflowError::InvalidConfig("model must not be empty".into()));
        }
        if c.endpoint.trim().is_empty() {
            return Err(SumflowError::InvalidConfig(
                "endpoint must not be empty".into(),
            ));
        }
        if c.max_output_tokens == 0 {
            return Err(SumflowError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = SummaryConfig::builder().api_key("k").build().unwrap();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.max_output_tokens, 2048);
        assert!(c.prompt_template.is_none());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = SummaryConfig::builder()
            .api_key("k")
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn zero_output_tokens_rejected() {
        let err = SummaryConfig::builder()
            .api_key("k")
            .max_output_tokens(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, SumflowError::InvalidConfig(_)));
    }

    #[test]
    fn empty_model_rejected() {
        let err = SummaryConfig::builder()
            .api_key("k")
            .model("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, SumflowError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_credential() {
        let c = SummaryConfig::builder().api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
    }
}
