//! Generation Layer
//!
//! Everything between structural metadata and documentation text: the
//! completion provider abstraction, the sliding-window rate limiter, the
//! content-addressed generation cache, prompt/template rendering, and the
//! generator that ties them together.

pub mod cache;
pub mod generator;
pub mod prompt;
pub mod provider;
pub mod rate_limiter;
pub mod template;

pub use cache::{CacheEntry, CacheStats, GenerationCache, cache_key};
pub use generator::{DocGenerator, FileDocs, RetryPolicy};
pub use provider::{
    CompletionProvider, CompletionRequest, GroqProvider, SharedProvider, create_provider,
};
pub use rate_limiter::RateLimiter;
