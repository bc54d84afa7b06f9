//! Core Types
//!
//! Data model and unified error types shared across the pipeline.

pub mod error;
pub mod module_info;
pub mod unit;

pub use error::{AutoDocError, GenerationError, GenerationErrorKind, Result};
pub use module_info::{ClassInfo, FunctionInfo, ModuleInfo, ParamInfo};
pub use unit::{DocSource, FallbackReason, GeneratedDoc, UnitKind};
