//! Configuration
//!
//! Layered configuration (defaults → global → project → env) and the
//! generation-config fingerprint that feeds cache keys.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    AnalysisConfig, CacheConfig, Config, GenerationConfig, OutputConfig, ProjectConfig, RateConfig,
};
