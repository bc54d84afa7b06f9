//! Python Structural Extraction
//!
//! Walks the tree-sitter syntax tree for one Python file, collecting
//! top-level functions, classes with their methods and attribute
//! assignments, imports, and docstrings.

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo, ParamInfo, Result};

use super::{
    DeclKind, Language, Parser, create_ts_parser, line_span, node_text, push_unique, split_params,
};

pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Result<Self> {
        // Validate that the grammar is available
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl Parser for PythonParser {
    fn parse(&self, path: &str, content: &str) -> Result<ModuleInfo> {
        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| crate::types::AutoDocError::parse(path, "Failed to parse Python file"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(crate::types::AutoDocError::parse(
                path,
                "Syntax error in Python file",
            ));
        }

        let bytes = content.as_bytes();
        let mut module = ModuleInfo::new(path);
        let mut cursor = root.walk();
        let mut first_statement = true;

        for child in root.named_children(&mut cursor) {
            // Comments are not statements; they must not displace the
            // module docstring position
            if child.kind() == "comment" {
                continue;
            }

            match classify(child.kind()) {
                DeclKind::Docstring => {
                    if first_statement && module.docstring.is_none() {
                        module.docstring = extract_docstring_expr(child, bytes);
                    }
                }
                DeclKind::Function => {
                    // A decorated_definition classifies as Function; route by
                    // the inner definition kind.
                    if unwrap_decorated(child).kind() == "class_definition" {
                        if let Some(class) = extract_class(child, bytes)
                            && !module.classes.iter().any(|c| c.name == class.name)
                        {
                            module.classes.push(class);
                        }
                    } else if let Some(func) = extract_function(child, bytes) {
                        push_unique(&mut module.functions, func);
                    }
                }
                DeclKind::Class => {
                    if let Some(class) = extract_class(child, bytes)
                        && !module.classes.iter().any(|c| c.name == class.name)
                    {
                        module.classes.push(class);
                    }
                }
                DeclKind::Import => {
                    let text = node_text(child, bytes).trim().to_string();
                    if !text.is_empty() {
                        module.imports.push(text);
                    }
                }
                DeclKind::Other => {}
            }
            first_statement = false;
        }

        Ok(module)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// Exhaustive classification of top-level Python statement kinds
fn classify(kind: &str) -> DeclKind {
    match kind {
        "function_definition" | "decorated_definition" => DeclKind::Function,
        "class_definition" => DeclKind::Class,
        "import_statement" | "import_from_statement" | "future_import_statement" => {
            DeclKind::Import
        }
        "expression_statement" => DeclKind::Docstring,
        _ => DeclKind::Other,
    }
}

/// Unwrap `decorated_definition` to the inner function/class node
fn unwrap_decorated(node: tree_sitter::Node) -> tree_sitter::Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn extract_function(node: tree_sitter::Node, content: &[u8]) -> Option<FunctionInfo> {
    let node = unwrap_decorated(node);
    if node.kind() != "function_definition" {
        return None;
    }

    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, content).to_string();
    if name.is_empty() {
        return None;
    }

    let params = node
        .child_by_field_name("parameters")
        .map(|p| parse_parameters(node_text(p, content)))
        .unwrap_or_default();

    let return_annotation = node
        .child_by_field_name("return_type")
        .map(|r| node_text(r, content).to_string());

    let is_async = {
        let mut cursor = node.walk();
        node.children(&mut cursor).any(|c| c.kind() == "async")
    };

    let body = node.child_by_field_name("body");
    let docstring = body.and_then(|b| extract_block_docstring(b, content));
    let nested = body
        .map(|b| extract_nested_functions(b, content))
        .unwrap_or_default();

    Some(FunctionInfo {
        name,
        params,
        return_annotation,
        docstring,
        is_async,
        line_span: line_span(node),
        nested,
    })
}

/// Collect function/class definitions declared directly inside a function
/// body. They stay children of the enclosing function.
fn extract_nested_functions(body: tree_sitter::Node, content: &[u8]) -> Vec<FunctionInfo> {
    let mut nested = Vec::new();
    let mut cursor = body.walk();

    for child in body.named_children(&mut cursor) {
        match classify(child.kind()) {
            DeclKind::Function => {
                if let Some(func) = extract_function(child, content) {
                    push_unique(&mut nested, func);
                }
            }
            DeclKind::Class | DeclKind::Import | DeclKind::Docstring | DeclKind::Other => {}
        }
    }

    nested
}

fn extract_class(node: tree_sitter::Node, content: &[u8]) -> Option<ClassInfo> {
    let node = unwrap_decorated(node);
    if node.kind() != "class_definition" {
        return None;
    }

    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, content).to_string();

    let bases = node
        .child_by_field_name("superclasses")
        .map(|s| {
            let text = node_text(s, content);
            split_params(text.trim_start_matches('(').trim_end_matches(')'))
        })
        .unwrap_or_default();

    let mut methods = Vec::new();
    let mut attributes = Vec::new();
    let mut docstring = None;

    if let Some(body) = node.child_by_field_name("body") {
        docstring = extract_block_docstring(body, content);

        let mut cursor = body.walk();
        for item in body.named_children(&mut cursor) {
            match classify(item.kind()) {
                DeclKind::Function => {
                    if let Some(method) = extract_function(item, content) {
                        push_unique(&mut methods, method);
                    }
                }
                DeclKind::Docstring => {
                    // Attribute assignments arrive as expression_statement
                    for attr in extract_attribute_names(item, content) {
                        if !attributes.contains(&attr) {
                            attributes.push(attr);
                        }
                    }
                }
                DeclKind::Class | DeclKind::Import | DeclKind::Other => {}
            }
        }
    }

    Some(ClassInfo {
        name,
        docstring,
        methods,
        attributes,
        bases,
        line_span: line_span(node),
    })
}

/// First statement of a block, when it is a bare string literal
fn extract_block_docstring(body: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body.named_children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    extract_docstring_expr(first, content)
}

fn extract_docstring_expr(stmt: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut cursor = stmt.walk();
    let inner = stmt.named_children(&mut cursor).next()?;
    if inner.kind() != "string" {
        return None;
    }
    Some(clean_string_literal(node_text(inner, content)))
}

/// Names bound by a simple assignment statement (`x = ...`, `x: T = ...`)
fn extract_attribute_names(stmt: tree_sitter::Node, content: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = stmt.walk();

    for inner in stmt.named_children(&mut cursor) {
        if inner.kind() == "assignment"
            && let Some(left) = inner.child_by_field_name("left")
            && left.kind() == "identifier"
        {
            names.push(node_text(left, content).to_string());
        }
    }

    names
}

/// Strip string prefixes and quote delimiters from a Python string literal
fn clean_string_literal(raw: &str) -> String {
    let trimmed = raw
        .trim_start_matches(['r', 'R', 'b', 'B', 'u', 'U', 'f', 'F'])
        .trim();

    let without_quotes = if let Some(inner) = trimmed
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
    {
        inner
    } else if let Some(inner) = trimmed
        .strip_prefix("'''")
        .and_then(|s| s.strip_suffix("'''"))
    {
        inner
    } else if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        inner
    } else if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        inner
    } else {
        trimmed
    };

    without_quotes.trim().to_string()
}

fn parse_parameters(params_text: &str) -> Vec<ParamInfo> {
    let inner = params_text.trim_start_matches('(').trim_end_matches(')');

    split_params(inner)
        .into_iter()
        .filter_map(|p| {
            let p = p.trim();
            if p.is_empty() || p == "self" || p == "cls" || p == "*" || p == "/" {
                return None;
            }

            // Drop default value, keep `name: annotation`
            let without_default = p.split('=').next().unwrap_or(p).trim();
            let mut parts = without_default.splitn(2, ':');
            let name = parts
                .next()
                .unwrap_or(without_default)
                .trim()
                .trim_start_matches('*')
                .to_string();
            if name.is_empty() {
                return None;
            }

            let annotation = parts.next().map(|t| t.trim().to_string());
            Some(ParamInfo { name, annotation })
        })
        .collect()
}
