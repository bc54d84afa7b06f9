//! Rust Structural Extraction
//!
//! Maps Rust declarations onto the shared structural model: free functions
//! become functions, structs and enums become classes, and `impl` blocks
//! contribute methods (with the implemented trait recorded as a base).

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo, ParamInfo, Result};

use super::{DeclKind, Language, Parser, create_ts_parser, line_span, node_text, push_unique};

pub struct RustParser;

impl RustParser {
    pub fn new() -> Result<Self> {
        let _ = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;
        Ok(Self)
    }
}

impl Parser for RustParser {
    fn parse(&self, path: &str, content: &str) -> Result<ModuleInfo> {
        let mut parser = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| crate::types::AutoDocError::parse(path, "Failed to parse Rust file"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(crate::types::AutoDocError::parse(
                path,
                "Syntax error in Rust file",
            ));
        }

        let bytes = content.as_bytes();
        let mut module = ModuleInfo::new(path);
        let mut pending_docs: Vec<String> = Vec::new();
        let mut module_docs: Vec<String> = Vec::new();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.kind() == "line_comment" {
                let text = node_text(child, bytes);
                if let Some(inner) = text.strip_prefix("//!") {
                    module_docs.push(inner.trim().to_string());
                } else if let Some(inner) = text.strip_prefix("///") {
                    pending_docs.push(inner.trim().to_string());
                } else {
                    pending_docs.clear();
                }
                continue;
            }

            // Attribute items (#[derive], #[cfg]) sit between docs and the
            // declaration; keep the accumulated docs across them.
            if child.kind() == "attribute_item" {
                continue;
            }

            let docstring = join_docs(&pending_docs);
            pending_docs.clear();

            match classify(child.kind()) {
                DeclKind::Function => {
                    if let Some(func) = extract_function(child, bytes, docstring) {
                        push_unique(&mut module.functions, func);
                    }
                }
                DeclKind::Class => {
                    if let Some(class) = extract_type(child, bytes, docstring)
                        && !module.classes.iter().any(|c| c.name == class.name)
                    {
                        module.classes.push(class);
                    }
                }
                DeclKind::Import => {
                    module
                        .imports
                        .push(node_text(child, bytes).trim().to_string());
                }
                DeclKind::Docstring | DeclKind::Other => {
                    if child.kind() == "impl_item" {
                        merge_impl_block(child, bytes, &mut module.classes);
                    }
                }
            }
        }

        if !module_docs.is_empty() {
            module.docstring = Some(module_docs.join("\n").trim().to_string());
        }

        Ok(module)
    }

    fn language(&self) -> Language {
        Language::Rust
    }
}

/// Exhaustive classification of top-level Rust item kinds
fn classify(kind: &str) -> DeclKind {
    match kind {
        "function_item" => DeclKind::Function,
        "struct_item" | "enum_item" => DeclKind::Class,
        "use_declaration" => DeclKind::Import,
        _ => DeclKind::Other,
    }
}

fn join_docs(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

fn extract_function(
    node: tree_sitter::Node,
    content: &[u8],
    docstring: Option<String>,
) -> Option<FunctionInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, content).to_string();

    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(p, content))
        .unwrap_or_default();

    let return_annotation = node
        .child_by_field_name("return_type")
        .map(|r| node_text(r, content).to_string());

    let is_async = {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| c.kind() == "function_modifiers" && node_text(c, content).contains("async"))
    };

    let nested = node
        .child_by_field_name("body")
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

fn extract_parameters(params: tree_sitter::Node, content: &[u8]) -> Vec<ParamInfo> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "parameter" => {
                let name = child
                    .child_by_field_name("pattern")
                    .map(|p| node_text(p, content).to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let annotation = child
                    .child_by_field_name("type")
                    .map(|t| node_text(t, content).to_string());
                result.push(ParamInfo { name, annotation });
            }
            // &self / &mut self carry no documentation value
            "self_parameter" => {}
            _ => {}
        }
    }

    result
}

fn extract_nested_functions(body: tree_sitter::Node, content: &[u8]) -> Vec<FunctionInfo> {
    let mut nested = Vec::new();
    let mut cursor = body.walk();

    for child in body.named_children(&mut cursor) {
        if child.kind() == "function_item"
            && let Some(func) = extract_function(child, content, None)
        {
            push_unique(&mut nested, func);
        }
    }

    nested
}

/// Struct or enum declaration → class with field/variant names as attributes
fn extract_type(
    node: tree_sitter::Node,
    content: &[u8],
    docstring: Option<String>,
) -> Option<ClassInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, content).to_string();

    let mut attributes = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for field in body.named_children(&mut cursor) {
            match field.kind() {
                "field_declaration" | "enum_variant" => {
                    if let Some(field_name) = field.child_by_field_name("name") {
                        attributes.push(node_text(field_name, content).to_string());
                    }
                }
                _ => {}
            }
        }
    }

    Some(ClassInfo {
        name,
        docstring,
        methods: Vec::new(),
        attributes,
        bases: Vec::new(),
        line_span: line_span(node),
    })
}

/// Fold an `impl` block's functions into the matching class. Creates the
/// class record when the type itself is declared in another file.
fn merge_impl_block(node: tree_sitter::Node, content: &[u8], classes: &mut Vec<ClassInfo>) {
    let Some(type_node) = node.child_by_field_name("type") else {
        return;
    };
    let type_name = base_type_name(node_text(type_node, content));

    let trait_name = node
        .child_by_field_name("trait")
        .map(|t| node_text(t, content).to_string());

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut pending_docs: Vec<String> = Vec::new();
        let mut cursor = body.walk();
        for item in body.named_children(&mut cursor) {
            match item.kind() {
                "line_comment" => {
                    let text = node_text(item, content);
                    if let Some(inner) = text.strip_prefix("///") {
                        pending_docs.push(inner.trim().to_string());
                    } else {
                        pending_docs.clear();
                    }
                }
                "attribute_item" => {}
                "function_item" => {
                    let docs = join_docs(&pending_docs);
                    pending_docs.clear();
                    if let Some(func) = extract_function(item, content, docs) {
                        methods.push(func);
                    }
                }
                _ => pending_docs.clear(),
            }
        }
    }

    let class = match classes.iter_mut().find(|c| c.name == type_name) {
        Some(existing) => existing,
        None => {
            classes.push(ClassInfo {
                name: type_name,
                docstring: None,
                methods: Vec::new(),
                attributes: Vec::new(),
                bases: Vec::new(),
                line_span: line_span(node),
            });
            classes.last_mut().expect("just pushed")
        }
    };

    for method in methods {
        push_unique(&mut class.methods, method);
    }
    if let Some(trait_name) = trait_name
        && !class.bases.contains(&trait_name)
    {
        class.bases.push(trait_name);
    }
}

/// `Foo<T>` → `Foo`
fn base_type_name(text: &str) -> String {
    text.split('<').next().unwrap_or(text).trim().to_string()
}
