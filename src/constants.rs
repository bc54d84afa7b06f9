//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// File analysis constants
pub mod analysis {
    /// Maximum file size to parse (1MB); larger files are skipped, not errors
    pub const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Default number of files per processing chunk
    pub const DEFAULT_CHUNK_SIZE: usize = 15;

    /// Default bounded-parallelism width for per-file parsing
    pub const DEFAULT_WORKERS: usize = 4;
}

/// Rate limiter constants
pub mod rate {
    /// Default ceiling on generation requests per window
    pub const DEFAULT_MAX_REQUESTS: usize = 100;

    /// Default sliding window length (seconds)
    pub const DEFAULT_WINDOW_SECS: u64 = 60;
}

/// Retry/backoff constants for generation calls
pub mod retry {
    /// Maximum retries per unit before falling back to the template
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Generation cache constants
pub mod cache {
    /// Cache entry expiration (hours)
    pub const DEFAULT_TTL_HOURS: u64 = 168;

    /// Maximum size of a single cached text (bytes)
    pub const MAX_CACHED_CONTENT_SIZE: usize = 1024 * 1024;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout for generation calls (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Generation defaults
pub mod generation {
    /// Default model served by the completion endpoint
    pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

    /// Default maximum tokens per completion
    pub const DEFAULT_MAX_TOKENS: u32 = 1000;

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
}
