//! Generation Units
//!
//! A unit is the smallest thing documentation is generated for: a function,
//! a class, a whole file, or the whole project. The generator returns an
//! explicit source marker so callers can tell AI-sourced text from the
//! deterministic template fallback without inspecting logs.

use serde::{Deserialize, Serialize};

/// The kind of unit a piece of documentation describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Function,
    Class,
    File,
    Overview,
}

impl UnitKind {
    /// Stable tag mixed into cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::File => "file",
            Self::Overview => "overview",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the deterministic template was used instead of the capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Transient failures exhausted the retry budget
    RetriesExhausted,
    /// No provider was configured for this run
    NoProvider,
}

/// Where a piece of documentation text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocSource {
    /// Produced by the generation capability (or its cache)
    Generated,
    /// Produced by the structural template fallback
    Fallback(FallbackReason),
}

impl DocSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// One generated documentation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDoc {
    pub text: String,
    pub source: DocSource,
}

impl GeneratedDoc {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: DocSource::Generated,
        }
    }

    pub fn fallback(text: impl Into<String>, reason: FallbackReason) -> Self {
        Self {
            text: text.into(),
            source: DocSource::Fallback(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_kind_tags() {
        assert_eq!(UnitKind::Function.as_str(), "function");
        assert_eq!(UnitKind::Overview.as_str(), "overview");
    }

    #[test]
    fn test_doc_source_fallback_detection() {
        assert!(!GeneratedDoc::generated("x").source.is_fallback());
        assert!(
            GeneratedDoc::fallback("x", FallbackReason::RetriesExhausted)
                .source
                .is_fallback()
        );
    }
}
