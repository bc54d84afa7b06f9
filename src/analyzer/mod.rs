//! Code Analyzer Module
//!
//! Structural extraction for the documentation pipeline:
//! - Multi-language parsing (tree-sitter AST extraction)
//! - Repository scanning with ignore-pattern pruning and chunked batching
//! - Change tracking against version control for incremental runs

pub mod change_tracker;
pub mod parser;
pub mod scanner;

pub use change_tracker::{ChangeSet, ChangeTracker};
pub use scanner::{ParseFailure, RepositoryScanner, ScanReport};
