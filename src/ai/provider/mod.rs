//! Generation Capability Providers
//!
//! Abstraction over the external text-generation service. Providers take a
//! prompt plus sampling parameters and return plain text, failing with a
//! classified [`GenerationError`] so the generator can route retries.

mod groq;

pub use groq::GroqProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::types::{AutoDocError, Result};

/// One completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Optional system message framing the task
    pub system: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: crate::constants::generation::DEFAULT_MAX_TOKENS,
            temperature: crate::constants::generation::DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Shared provider type for concurrent access across pipeline workers
pub type SharedProvider = Arc<dyn CompletionProvider + Send + Sync>;

/// Text completion provider
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce completion text for a prompt. Errors carry a
    /// [`crate::types::GenerationErrorKind`] for retry routing.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a provider from configuration. `provider = "none"` disables the
/// capability entirely; every unit then uses the template fallback.
pub fn create_provider(config: &GenerationConfig) -> Result<Option<SharedProvider>> {
    match config.provider.as_str() {
        "groq" => Ok(Some(Arc::new(GroqProvider::new(config)?))),
        "none" => Ok(None),
        other => Err(AutoDocError::Config(format!(
            "Unknown provider: {}. Supported: groq, none",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("describe this")
            .with_system("you are a writer")
            .with_max_tokens(256)
            .with_temperature(0.0);

        assert_eq!(request.prompt, "describe this");
        assert_eq!(request.system.as_deref(), Some("you are a writer"));
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_create_provider_none_disables() {
        let mut config = GenerationConfig::default();
        config.provider = "none".to_string();
        assert!(create_provider(&config).unwrap().is_none());
    }

    #[test]
    fn test_create_provider_unknown_fails() {
        let mut config = GenerationConfig::default();
        config.provider = "mystery".to_string();
        assert!(create_provider(&config).is_err());
    }
}
