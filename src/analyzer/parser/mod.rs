//! Language Parser Module
//!
//! Tree-sitter based structural extraction for the supported languages.
//!
//! ## Parser Factory
//!
//! ```rust,ignore
//! use autodocs::analyzer::parser::{Language, create_parser};
//!
//! let parser = create_parser(Language::Python)?;
//! let module_info = parser.parse("app.py", content)?;
//! ```

pub mod go;
pub mod language;
pub mod python;
pub mod rust_lang;
pub mod traits;
pub mod typescript;

pub use go::GoParser;
pub use language::{Language, detect_language};
pub use python::PythonParser;
pub use rust_lang::RustParser;
pub use traits::{
    DeclKind, Parser, create_ts_parser, line_span, node_text, push_unique, split_params,
};
pub use typescript::TypeScriptParser;

use crate::types::{AutoDocError, Result};

/// Create a parser for the given language.
///
/// Returns an error if the language has no structural extraction support.
pub fn create_parser(language: Language) -> Result<Box<dyn Parser>> {
    match language {
        Language::Python => Ok(Box::new(PythonParser::new()?)),
        Language::Rust => Ok(Box::new(RustParser::new()?)),
        Language::TypeScript | Language::JavaScript => {
            Ok(Box::new(TypeScriptParser::new(language)?))
        }
        Language::Go => Ok(Box::new(GoParser::new()?)),
        Language::Unknown => Err(AutoDocError::Config(format!(
            "No parser support for language: {}",
            language
        ))),
    }
}

/// Try to create a parser for a file path.
///
/// Detects the language from the extension; `None` when unsupported.
pub fn create_parser_for_path(path: &str) -> Option<Box<dyn Parser>> {
    detect_language(path).and_then(|lang| create_parser(lang).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parser_known_languages() {
        for lang in [
            Language::Python,
            Language::Rust,
            Language::TypeScript,
            Language::JavaScript,
            Language::Go,
        ] {
            let parser = create_parser(lang);
            assert!(parser.is_ok(), "expected parser for {}", lang);
        }
    }

    #[test]
    fn test_create_parser_unknown_fails() {
        assert!(create_parser(Language::Unknown).is_err());
    }

    #[test]
    fn test_create_parser_for_path() {
        assert!(create_parser_for_path("src/main.rs").is_some());
        assert!(create_parser_for_path("README.md").is_none());
    }
}
