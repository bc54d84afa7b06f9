//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for retry and fallback decisions.
//!
//! ## Generation Error Kinds
//!
//! - **RateLimited**: remote side rejected for rate (wait and retry)
//! - **Timeout**: call exceeded its deadline (retry)
//! - **Unavailable**: 5xx-equivalent service trouble (retry)
//! - **Auth**: bad credentials (fail fast, retrying cannot help)
//!
//! ## Design Principles
//!
//! - Single unified error type (AutoDocError) for the entire application
//! - Per-file and per-unit failures are isolated; only auth failures and an
//!   inaccessible repository root abort a run
//! - No panic/unwrap outside tests

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Generation Error
// =============================================================================

/// Failure kinds for the external generation capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Authentication failed - fatal, surfaced immediately
    Auth,
    /// Remote rate limit rejection - wait then retry
    RateLimited,
    /// Per-call deadline exceeded - retry
    Timeout,
    /// Service unavailable / server error - retry
    Unavailable,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

impl GenerationErrorKind {
    /// Whether a retry with backoff can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Timeout | Self::Unavailable)
    }

    /// Whether the run must surface this immediately
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Get recommended retry delay for this kind
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimited => Duration::from_secs(30),
            Self::Timeout => Duration::from_secs(5),
            Self::Unavailable => Duration::from_secs(2),
            Self::Auth => Duration::ZERO,
        }
    }
}

/// Generation capability error with kind, context, and retry hints
#[derive(Debug, Clone)]
pub struct GenerationError {
    /// Error kind for routing decisions
    pub kind: GenerationErrorKind,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Suggested wait time before retry (if applicable)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.kind, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for GenerationError {}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        kind: GenerationErrorKind,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Get recommended retry delay
    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.kind.recommended_delay())
    }

    /// Classify an HTTP status code from the completion endpoint
    pub fn from_http_status(status: u16, message: impl Into<String>, provider: &str) -> Self {
        match status {
            401 | 403 => Self::with_provider(GenerationErrorKind::Auth, message, provider),
            429 => Self::with_provider(GenerationErrorKind::RateLimited, message, provider)
                .retry_after(Duration::from_secs(30)),
            408 | 504 => Self::with_provider(GenerationErrorKind::Timeout, message, provider),
            500 | 502 | 503 => {
                Self::with_provider(GenerationErrorKind::Unavailable, message, provider)
                    .retry_after(Duration::from_secs(5))
            }
            _ => Self::with_provider(GenerationErrorKind::Unavailable, message, provider),
        }
    }

    /// Classify a transport-level error message (no status available)
    pub fn from_transport(message: &str, provider: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("timed out") || lower.contains("timeout") {
            return Self::with_provider(GenerationErrorKind::Timeout, message, provider);
        }
        if lower.contains("unauthorized") || lower.contains("api key") || lower.contains("auth") {
            return Self::with_provider(GenerationErrorKind::Auth, message, provider);
        }
        if lower.contains("rate limit") || lower.contains("too many requests") {
            return Self::with_provider(GenerationErrorKind::RateLimited, message, provider)
                .retry_after(Duration::from_secs(30));
        }

        Self::with_provider(GenerationErrorKind::Unavailable, message, provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AutoDocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Syntax error in one source file; the file is skipped, the run continues
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Generation error: {0}")]
    Generation(GenerationError),

    /// Operation deadline exceeded (counts as transient at the call site)
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Hook error: {0}")]
    Hook(String),
}

impl From<GenerationError> for AutoDocError {
    fn from(err: GenerationError) -> Self {
        AutoDocError::Generation(err)
    }
}

impl AutoDocError {
    /// Create a parse error for a path
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Check if this error can be retried at the generation layer
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Generation(e) => e.is_transient(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Check if this error must abort the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Generation(e) if e.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, AutoDocError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(GenerationErrorKind::Auth.to_string(), "AUTH");
        assert_eq!(GenerationErrorKind::RateLimited.to_string(), "RATE_LIMITED");
    }

    #[test]
    fn test_kind_routing() {
        assert!(GenerationErrorKind::RateLimited.is_transient());
        assert!(GenerationErrorKind::Timeout.is_transient());
        assert!(GenerationErrorKind::Unavailable.is_transient());
        assert!(!GenerationErrorKind::Auth.is_transient());
        assert!(GenerationErrorKind::Auth.is_fatal());
    }

    #[test]
    fn test_from_http_status() {
        let auth = GenerationError::from_http_status(401, "Unauthorized", "groq");
        assert_eq!(auth.kind, GenerationErrorKind::Auth);
        assert!(auth.is_fatal());

        let rate = GenerationError::from_http_status(429, "Too many requests", "groq");
        assert_eq!(rate.kind, GenerationErrorKind::RateLimited);
        assert!(rate.retry_after.is_some());

        let server = GenerationError::from_http_status(503, "Service unavailable", "groq");
        assert_eq!(server.kind, GenerationErrorKind::Unavailable);
        assert!(server.is_transient());
    }

    #[test]
    fn test_from_transport() {
        let timeout = GenerationError::from_transport("connection timed out", "groq");
        assert_eq!(timeout.kind, GenerationErrorKind::Timeout);

        let unknown = GenerationError::from_transport("connection reset by peer", "groq");
        assert_eq!(unknown.kind, GenerationErrorKind::Unavailable);
    }

    #[test]
    fn test_recommended_delay_override() {
        let custom = GenerationError::new(GenerationErrorKind::Unavailable, "x")
            .retry_after(Duration::from_secs(100));
        assert_eq!(custom.recommended_delay(), Duration::from_secs(100));

        let default = GenerationError::new(GenerationErrorKind::RateLimited, "x");
        assert_eq!(default.recommended_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_display_with_provider() {
        let err =
            GenerationError::with_provider(GenerationErrorKind::RateLimited, "slow down", "groq");
        assert_eq!(err.to_string(), "[groq:RATE_LIMITED] slow down");
    }

    #[test]
    fn test_app_error_routing() {
        let transient: AutoDocError =
            GenerationError::new(GenerationErrorKind::Timeout, "deadline").into();
        assert!(transient.is_transient());
        assert!(!transient.is_fatal());

        let fatal: AutoDocError =
            GenerationError::new(GenerationErrorKind::Auth, "bad key").into();
        assert!(fatal.is_fatal());
    }
}
