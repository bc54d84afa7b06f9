//! Go Structural Extraction
//!
//! Free functions map directly; struct and interface types become classes,
//! with methods attached via their receiver type. Leading `//` comment runs
//! become docstrings, following Go documentation convention.

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo, ParamInfo, Result};

use super::{DeclKind, Language, Parser, create_ts_parser, line_span, node_text, push_unique};

pub struct GoParser;

impl GoParser {
    pub fn new() -> Result<Self> {
        let _ = create_ts_parser(tree_sitter_go::LANGUAGE, "Go")?;
        Ok(Self)
    }
}

impl Parser for GoParser {
    fn parse(&self, path: &str, content: &str) -> Result<ModuleInfo> {
        let mut parser = create_ts_parser(tree_sitter_go::LANGUAGE, "Go")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| crate::types::AutoDocError::parse(path, "Failed to parse Go file"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(crate::types::AutoDocError::parse(
                path,
                "Syntax error in Go file",
            ));
        }

        let bytes = content.as_bytes();
        let mut module = ModuleInfo::new(path);
        let mut pending_docs: Vec<String> = Vec::new();
        let mut package_doc: Option<String> = None;
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.kind() == "comment" {
                let text = node_text(child, bytes);
                if let Some(inner) = text.strip_prefix("//") {
                    pending_docs.push(inner.trim().to_string());
                } else {
                    // Block comment: take as a single doc chunk
                    pending_docs.push(
                        text.trim_start_matches("/*")
                            .trim_end_matches("*/")
                            .trim()
                            .to_string(),
                    );
                }
                continue;
            }

            if child.kind() == "package_clause" {
                if !pending_docs.is_empty() {
                    package_doc = Some(pending_docs.join("\n").trim().to_string());
                }
                pending_docs.clear();
                continue;
            }

            let docstring = if pending_docs.is_empty() {
                None
            } else {
                Some(pending_docs.join("\n").trim().to_string())
            };
            pending_docs.clear();

            match classify(child.kind()) {
                DeclKind::Function => {
                    if child.kind() == "method_declaration" {
                        merge_method(child, bytes, docstring, &mut module.classes);
                    } else if let Some(func) = extract_function(child, bytes, docstring) {
                        push_unique(&mut module.functions, func);
                    }
                }
                DeclKind::Class => {
                    for class in extract_type_declaration(child, bytes, docstring.clone()) {
                        // A method seen earlier may have created the record
                        match module.classes.iter_mut().find(|c| c.name == class.name) {
                            Some(existing) => {
                                if existing.docstring.is_none() {
                                    existing.docstring = class.docstring;
                                }
                                if existing.attributes.is_empty() {
                                    existing.attributes = class.attributes;
                                }
                            }
                            None => module.classes.push(class),
                        }
                    }
                }
                DeclKind::Import => {
                    collect_imports(child, bytes, &mut module.imports);
                }
                DeclKind::Docstring | DeclKind::Other => {}
            }
        }

        module.docstring = package_doc;
        Ok(module)
    }

    fn language(&self) -> Language {
        Language::Go
    }
}

/// Exhaustive classification of top-level Go declaration kinds
fn classify(kind: &str) -> DeclKind {
    match kind {
        "function_declaration" | "method_declaration" => DeclKind::Function,
        "type_declaration" => DeclKind::Class,
        "import_declaration" => DeclKind::Import,
        _ => DeclKind::Other,
    }
}

fn extract_function(
    node: tree_sitter::Node,
    bytes: &[u8],
    docstring: Option<String>,
) -> Option<FunctionInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, bytes).to_string();

    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(p, bytes))
        .unwrap_or_default();

    let return_annotation = node
        .child_by_field_name("result")
        .map(|r| node_text(r, bytes).to_string());

    Some(FunctionInfo {
        name,
        params,
        return_annotation,
        docstring,
        is_async: false,
        line_span: line_span(node),
        nested: Vec::new(),
    })
}

fn extract_parameters(params: tree_sitter::Node, bytes: &[u8]) -> Vec<ParamInfo> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        if child.kind() != "parameter_declaration" && child.kind() != "variadic_parameter_declaration"
        {
            continue;
        }

        let annotation = child
            .child_by_field_name("type")
            .map(|t| node_text(t, bytes).to_string());

        // Go allows several names per type: `a, b int`
        let mut names = Vec::new();
        let mut inner = child.walk();
        for part in child.named_children(&mut inner) {
            if part.kind() == "identifier" {
                names.push(node_text(part, bytes).to_string());
            }
        }

        if names.is_empty() {
            // Unnamed parameter (type only)
            if let Some(ann) = annotation {
                result.push(ParamInfo {
                    name: "_".to_string(),
                    annotation: Some(ann),
                });
            }
        } else {
            for name in names {
                result.push(ParamInfo {
                    name,
                    annotation: annotation.clone(),
                });
            }
        }
    }

    result
}

/// `func (r *Recv) Name(...)` attaches to the receiver's class record
fn merge_method(
    node: tree_sitter::Node,
    bytes: &[u8],
    docstring: Option<String>,
    classes: &mut Vec<ClassInfo>,
) {
    let Some(func) = extract_function(node, bytes, docstring) else {
        return;
    };

    let receiver_type = node
        .child_by_field_name("receiver")
        .map(|r| {
            node_text(r, bytes)
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split_whitespace()
                .last()
                .unwrap_or("")
                .trim_start_matches('*')
                .to_string()
        })
        .unwrap_or_default();

    if receiver_type.is_empty() {
        return;
    }

    let class = match classes.iter_mut().find(|c| c.name == receiver_type) {
        Some(existing) => existing,
        None => {
            classes.push(ClassInfo {
                name: receiver_type,
                docstring: None,
                methods: Vec::new(),
                attributes: Vec::new(),
                bases: Vec::new(),
                line_span: line_span(node),
            });
            classes.last_mut().expect("just pushed")
        }
    };

    push_unique(&mut class.methods, func);
}

/// `type X struct {...}` / `type Y interface {...}` declarations
fn extract_type_declaration(
    node: tree_sitter::Node,
    bytes: &[u8],
    docstring: Option<String>,
) -> Vec<ClassInfo> {
    let mut classes = Vec::new();
    let mut cursor = node.walk();

    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, bytes).to_string();

        let mut attributes = Vec::new();
        if let Some(type_node) = spec.child_by_field_name("type")
            && type_node.kind() == "struct_type"
        {
            let mut inner = type_node.walk();
            for list in type_node.named_children(&mut inner) {
                if list.kind() != "field_declaration_list" {
                    continue;
                }
                let mut fields = list.walk();
                for field in list.named_children(&mut fields) {
                    if field.kind() == "field_declaration"
                        && let Some(field_name) = field.child_by_field_name("name")
                    {
                        attributes.push(node_text(field_name, bytes).to_string());
                    }
                }
            }
        }

        classes.push(ClassInfo {
            name,
            docstring: docstring.clone(),
            methods: Vec::new(),
            attributes,
            bases: Vec::new(),
            line_span: line_span(spec),
        });
    }

    classes
}

fn collect_imports(node: tree_sitter::Node, bytes: &[u8], imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => imports.push(spec_path(child, bytes)),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        imports.push(spec_path(spec, bytes));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Import path without quotes, ignoring any alias
fn spec_path(spec: tree_sitter::Node, bytes: &[u8]) -> String {
    spec.child_by_field_name("path")
        .map(|p| node_text(p, bytes))
        .unwrap_or_else(|| node_text(spec, bytes))
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ModuleInfo {
        GoParser::new()
            .unwrap()
            .parse("pkg/sample.go", content)
            .unwrap()
    }

    #[test]
    fn test_package_doc_and_imports() {
        let module = parse(
            "// Package sample provides helpers.\npackage sample\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n",
        );

        assert_eq!(
            module.docstring.as_deref(),
            Some("Package sample provides helpers.")
        );
        assert_eq!(module.imports, vec!["fmt", "os"]);
    }

    #[test]
    fn test_function_extraction() {
        let module = parse(
            "package sample\n\n// Add sums two ints.\nfunc Add(a, b int) int {\n\treturn a + b\n}\n",
        );

        assert_eq!(module.functions.len(), 1);
        let f = &module.functions[0];
        assert_eq!(f.name, "Add");
        assert_eq!(f.docstring.as_deref(), Some("Add sums two ints."));
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].annotation.as_deref(), Some("int"));
        assert_eq!(f.return_annotation.as_deref(), Some("int"));
    }

    #[test]
    fn test_struct_with_methods() {
        let module = parse(
            r#"package sample

// Server handles requests.
type Server struct {
	Addr string
	port int
}

// Start begins listening.
func (s *Server) Start() error {
	return nil
}
"#,
        );

        assert_eq!(module.classes.len(), 1);
        let class = &module.classes[0];
        assert_eq!(class.name, "Server");
        assert_eq!(class.docstring.as_deref(), Some("Server handles requests."));
        assert_eq!(class.attributes, vec!["Addr", "port"]);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(
            class.methods[0].docstring.as_deref(),
            Some("Start begins listening.")
        );
    }

    #[test]
    fn test_method_before_struct_still_attaches() {
        let module = parse(
            "package sample\n\nfunc (c Client) Do() {}\n\ntype Client struct{}\n",
        );

        // Method created a class record first; the later declaration keeps it
        assert_eq!(module.classes.len(), 1);
        assert_eq!(module.classes[0].methods.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = GoParser::new().unwrap().parse("bad.go", "func {{{");
        assert!(result.is_err());
    }
}
