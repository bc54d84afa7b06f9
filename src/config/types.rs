//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/autodocs/) and project (.autodocs/) level
//! configuration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::constants::{analysis, cache, generation, network, rate, retry};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Project-specific settings
    pub project: ProjectConfig,

    /// Repository scanning and analysis settings
    pub analysis: AnalysisConfig,

    /// Generation capability settings
    pub generation: GenerationConfig,

    /// Generation cache settings
    pub cache: CacheConfig,

    /// Documentation output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            project: ProjectConfig::default(),
            analysis: AnalysisConfig::default(),
            generation: GenerationConfig::default(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `AutoDocError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(crate::types::AutoDocError::Config(format!(
                "generation temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.timeout_secs == 0 {
            return Err(crate::types::AutoDocError::Config(
                "generation timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.rate.max_requests == 0 {
            return Err(crate::types::AutoDocError::Config(
                "rate max_requests must be greater than 0".to_string(),
            ));
        }

        if self.generation.rate.window_secs == 0 {
            return Err(crate::types::AutoDocError::Config(
                "rate window_secs must be greater than 0".to_string(),
            ));
        }

        if self.analysis.chunk_size == 0 {
            return Err(crate::types::AutoDocError::Config(
                "analysis chunk_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Project Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (defaults to directory name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Glob patterns; any matching path segment excludes the file or prunes
    /// the directory subtree
    pub exclude_patterns: Vec<String>,

    /// Source languages to analyze (by name, lowercase)
    pub languages: Vec<String>,

    /// Files larger than this are skipped without parsing (bytes)
    pub max_file_size: u64,

    /// Number of files per processing chunk
    pub chunk_size: usize,

    /// Hard ceiling on files per run; the scan stops early and flags
    /// truncation when reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,

    /// Bounded-parallelism width for per-file parsing
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            languages: vec![
                "python".to_string(),
                "rust".to_string(),
                "typescript".to_string(),
                "go".to_string(),
            ],
            max_file_size: analysis::MAX_FILE_SIZE,
            chunk_size: analysis::DEFAULT_CHUNK_SIZE,
            max_files: None,
            workers: analysis::DEFAULT_WORKERS,
        }
    }
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "__pycache__",
        ".git",
        "node_modules",
        "target",
        "dist",
        "build",
        "venv",
        ".venv",
        "vendor",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// =============================================================================
// Generation Configuration
// =============================================================================

/// Sliding-window rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Maximum admitted requests within any trailing window
    pub max_requests: usize,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            max_requests: rate::DEFAULT_MAX_REQUESTS,
            window_secs: rate::DEFAULT_WINDOW_SECS,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider type: "groq" or "none" (template fallback only)
    pub provider: String,

    /// Model name (provider-specific)
    pub model: String,

    /// API key; never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Maximum tokens per completion
    pub max_tokens: u32,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Retry budget for transient failures before template fallback
    pub max_retries: u32,

    /// Sliding-window rate limit
    pub rate: RateConfig,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("rate", &self.rate)
            .finish()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: generation::DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            max_tokens: generation::DEFAULT_MAX_TOKENS,
            temperature: generation::DEFAULT_TEMPERATURE,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_retries: retry::DEFAULT_MAX_RETRIES,
            rate: RateConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Stable fingerprint over the fields that shape generated text. Mixed
    /// into every cache key so a prompt/model change invalidates all cached
    /// entries without any content changing.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.provider.as_bytes());
        hasher.update([0]);
        hasher.update(self.model.as_bytes());
        hasher.update([0]);
        hasher.update(self.max_tokens.to_le_bytes());
        hasher.update(self.temperature.to_le_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// =============================================================================
// Cache Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for persisted cache records
    pub dir: PathBuf,

    /// Entries older than this are treated as absent on lookup
    pub ttl_hours: u64,

    /// Whether to persist entries across runs
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".autodocs/cache"),
            ttl_hours: cache::DEFAULT_TTL_HOURS,
            persist: true,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the generated documentation tree
    pub dir: PathBuf,

    /// Extension for leaf documents
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            extension: "md".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.generation.rate.window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fingerprint_changes_with_model() {
        let a = GenerationConfig::default();
        let mut b = a.clone();
        b.model = "other-model".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_api_key() {
        let a = GenerationConfig::default();
        let mut b = a.clone();
        b.api_key = Some("secret".to_string());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let mut config = GenerationConfig::default();
        config.api_key = Some("secret-key".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}
