//! Parser Trait and Shared Helpers
//!
//! Each language parser turns one file's content into a [`ModuleInfo`].
//! Syntax-tree nodes are classified into a closed [`DeclKind`] set so the
//! extraction walks dispatch with exhaustive pattern matching instead of
//! probing node attributes.

use crate::types::{AutoDocError, FunctionInfo, ModuleInfo, Result};

use super::Language;

pub trait Parser: Send + Sync {
    /// Parse one file into its structural description. Pure function of the
    /// content; performs no I/O.
    fn parse(&self, path: &str, content: &str) -> Result<ModuleInfo>;

    fn language(&self) -> Language;
}

/// Closed set of declaration kinds a top-level walk distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    Class,
    Import,
    Docstring,
    Other,
}

/// Create a tree-sitter parser for the given language.
/// This helper reduces boilerplate in language-specific parsers.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| AutoDocError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based (start, end) line span of a node
#[inline]
pub fn line_span(node: tree_sitter::Node) -> (u32, u32) {
    (
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Record a function under first-seen-signature-wins semantics: a name seen
/// twice in one scope (overloads, decorator stacking) keeps its first entry.
pub fn push_unique(functions: &mut Vec<FunctionInfo>, candidate: FunctionInfo) {
    if functions.iter().any(|f| f.name == candidate.name) {
        return;
    }
    functions.push(candidate);
}

/// Split a parameter list on commas at bracket depth zero, so annotations
/// like `Dict[str, int]` or `Map<K, V>` stay in one piece.
pub fn split_params(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for ch in inner.chars() {
        match ch {
            '[' | '(' | '{' | '<' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' | '}' | '>' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }

    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamInfo;

    fn named(name: &str) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            params: vec![ParamInfo::new("x")],
            return_annotation: None,
            docstring: None,
            is_async: false,
            line_span: (1, 1),
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_push_unique_keeps_first_seen() {
        let mut funcs = Vec::new();
        push_unique(&mut funcs, named("handler"));

        let mut second = named("handler");
        second.params.push(ParamInfo::new("extra"));
        push_unique(&mut funcs, second);

        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].params.len(), 1);
    }

    #[test]
    fn test_split_params_respects_brackets() {
        assert_eq!(
            split_params("a: Dict[str, int], b"),
            vec!["a: Dict[str, int]", "b"]
        );
        assert_eq!(
            split_params("x: Map<K, V>, y: int"),
            vec!["x: Map<K, V>", "y: int"]
        );
        assert_eq!(split_params(""), Vec::<String>::new());
    }
}
