//! autodocs - AI-Assisted Repository Documentation Generator
//!
//! Analyzes a source repository, extracts structural metadata per file
//! (modules, classes, functions, signatures), and drives an external
//! text-generation capability to produce documentation. Redundant work is
//! avoided through a content-addressed cache, calls to the capability are
//! guarded by a sliding-window rate limiter, and repository changes are
//! picked up incrementally from version control.
//!
//! ## Pipeline
//!
//! ```text
//! RepositoryScanner (+ChangeTracker) → parsers → DocGenerator
//!     (GenerationCache, RateLimiter) → DocumentationOrganizer → docs/
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use autodocs::config::Config;
//! use autodocs::pipeline::{Pipeline, PipelineOptions};
//!
//! let pipeline = Pipeline::from_config(".", Config::default())?;
//! let summary = pipeline.run(&PipelineOptions::default()).await?;
//! println!("{} files documented", summary.analyzed);
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: tree-sitter parsing, repository scanning, change tracking
//! - [`ai`]: provider abstraction, rate limiting, caching, generation
//! - [`organizer`]: output tree assembly and writing
//! - [`pipeline`]: orchestration and run summaries
//! - [`vcs`]: git hook management and staleness checks
//! - [`config`]: layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod organizer;
pub mod pipeline;
pub mod types;
pub mod vcs;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{AutoDocError, GenerationError, GenerationErrorKind, Result};

// Data Model
pub use types::{ClassInfo, DocSource, FunctionInfo, GeneratedDoc, ModuleInfo, UnitKind};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{ChangesSince, Pipeline, PipelineOptions, RunSummary};

// =============================================================================
// Stage Re-exports
// =============================================================================

pub use ai::{DocGenerator, GenerationCache, RateLimiter, create_provider};
pub use analyzer::{
    ChangeTracker, RepositoryScanner, ScanReport,
    parser::{Language, Parser, create_parser, detect_language},
};
pub use organizer::{DocNode, DocumentationOrganizer};
