//! TypeScript/JavaScript Structural Extraction
//!
//! One parser covers TypeScript, TSX, and JavaScript (the TS grammar is a
//! superset). Arrow functions bound by `const` are recorded as functions;
//! JSDoc blocks immediately above a declaration become its docstring.

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo, ParamInfo, Result};

use super::{
    DeclKind, Language, Parser, create_ts_parser, line_span, node_text, push_unique, split_params,
};

pub struct TypeScriptParser {
    language: Language,
}

impl TypeScriptParser {
    pub fn new(language: Language) -> Result<Self> {
        let _ = create_ts_parser(tree_sitter_typescript::LANGUAGE_TSX, "TypeScript")?;
        Ok(Self { language })
    }
}

impl Parser for TypeScriptParser {
    fn parse(&self, path: &str, content: &str) -> Result<ModuleInfo> {
        // TSX grammar parses plain TS/JS as well as JSX syntax
        let mut parser = create_ts_parser(tree_sitter_typescript::LANGUAGE_TSX, "TypeScript")?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            crate::types::AutoDocError::parse(path, "Failed to parse TypeScript file")
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(crate::types::AutoDocError::parse(
                path,
                "Syntax error in TypeScript file",
            ));
        }

        let bytes = content.as_bytes();
        let mut module = ModuleInfo::new(path);
        let mut pending_doc: Option<String> = None;
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.kind() == "comment" {
                let text = node_text(child, bytes);
                if text.starts_with("/**") {
                    pending_doc = Some(clean_jsdoc(text));
                }
                continue;
            }

            let doc = pending_doc.take();
            collect_declaration(child, bytes, doc, &mut module);
        }

        Ok(module)
    }

    fn language(&self) -> Language {
        self.language
    }
}

/// Exhaustive classification of top-level statement kinds
fn classify(kind: &str) -> DeclKind {
    match kind {
        "function_declaration" | "generator_function_declaration" | "lexical_declaration"
        | "variable_declaration" => DeclKind::Function,
        "class_declaration" | "abstract_class_declaration" => DeclKind::Class,
        "import_statement" => DeclKind::Import,
        _ => DeclKind::Other,
    }
}

fn collect_declaration(
    node: tree_sitter::Node,
    bytes: &[u8],
    doc: Option<String>,
    module: &mut ModuleInfo,
) {
    // export wrappers carry the real declaration in their declaration field
    if node.kind() == "export_statement" {
        if let Some(inner) = node.child_by_field_name("declaration") {
            collect_declaration(inner, bytes, doc, module);
        }
        return;
    }

    match classify(node.kind()) {
        DeclKind::Function => {
            if node.kind() == "lexical_declaration" || node.kind() == "variable_declaration" {
                if let Some(func) = extract_arrow_binding(node, bytes, doc) {
                    push_unique(&mut module.functions, func);
                }
            } else if let Some(func) = extract_function(node, bytes, doc) {
                push_unique(&mut module.functions, func);
            }
        }
        DeclKind::Class => {
            if let Some(class) = extract_class(node, bytes, doc)
                && !module.classes.iter().any(|c| c.name == class.name)
            {
                module.classes.push(class);
            }
        }
        DeclKind::Import => {
            module.imports.push(node_text(node, bytes).trim().to_string());
        }
        DeclKind::Docstring | DeclKind::Other => {}
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
        .map(|p| parse_parameters(node_text(p, bytes)))
        .unwrap_or_default();

    let return_annotation = node
        .child_by_field_name("return_type")
        .map(|r| node_text(r, bytes).trim_start_matches(':').trim().to_string());

    let is_async = has_async_keyword(node, bytes);

    let nested = node
        .child_by_field_name("body")
        .map(|b| extract_nested_functions(b, bytes))
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

/// `const name = (...) => ...` becomes a named function
fn extract_arrow_binding(
    node: tree_sitter::Node,
    bytes: &[u8],
    docstring: Option<String>,
) -> Option<FunctionInfo> {
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(value) = declarator.child_by_field_name("value") else {
            continue;
        };
        if value.kind() != "arrow_function" && value.kind() != "function_expression" {
            continue;
        }

        let name = declarator
            .child_by_field_name("name")
            .map(|n| node_text(n, bytes).to_string())?;

        let params = value
            .child_by_field_name("parameters")
            .map(|p| parse_parameters(node_text(p, bytes)))
            .unwrap_or_default();

        let return_annotation = value
            .child_by_field_name("return_type")
            .map(|r| node_text(r, bytes).trim_start_matches(':').trim().to_string());

        return Some(FunctionInfo {
            name,
            params,
            return_annotation,
            docstring,
            is_async: has_async_keyword(value, bytes),
            line_span: line_span(node),
            nested: Vec::new(),
        });
    }
    None
}

fn extract_class(
    node: tree_sitter::Node,
    bytes: &[u8],
    docstring: Option<String>,
) -> Option<ClassInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, bytes).to_string();

    // class_heritage > extends_clause holds base expressions
    let mut bases = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "class_heritage" {
            let text = node_text(child, bytes);
            let text = text
                .trim_start_matches("extends")
                .trim()
                .trim_start_matches("implements")
                .trim();
            for base in split_params(text) {
                bases.push(base);
            }
        }
    }

    let mut methods = Vec::new();
    let mut attributes = Vec::new();
    let mut class_doc_pending: Option<String> = None;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for item in body.named_children(&mut cursor) {
            match item.kind() {
                "comment" => {
                    let text = node_text(item, bytes);
                    if text.starts_with("/**") {
                        class_doc_pending = Some(clean_jsdoc(text));
                    }
                }
                "method_definition" => {
                    let doc = class_doc_pending.take();
                    if let Some(method) = extract_function(item, bytes, doc) {
                        push_unique(&mut methods, method);
                    }
                }
                "public_field_definition" | "field_definition" => {
                    class_doc_pending = None;
                    if let Some(field_name) = item.child_by_field_name("name") {
                        let field_name = node_text(field_name, bytes).to_string();
                        if !attributes.contains(&field_name) {
                            attributes.push(field_name);
                        }
                    }
                }
                _ => {
                    class_doc_pending = None;
                }
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

fn extract_nested_functions(body: tree_sitter::Node, bytes: &[u8]) -> Vec<FunctionInfo> {
    let mut nested = Vec::new();
    let mut cursor = body.walk();

    for child in body.named_children(&mut cursor) {
        if child.kind() == "function_declaration"
            && let Some(func) = extract_function(child, bytes, None)
        {
            push_unique(&mut nested, func);
        }
    }

    nested
}

fn has_async_keyword(node: tree_sitter::Node, bytes: &[u8]) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "async");
    if found {
        return true;
    }
    // Fallback: some grammar versions expose the modifier only in the text
    node_text(node, bytes).trim_start().starts_with("async")
}

fn parse_parameters(params_text: &str) -> Vec<ParamInfo> {
    let inner = params_text.trim_start_matches('(').trim_end_matches(')');

    split_params(inner)
        .into_iter()
        .filter_map(|p| {
            let p = p.trim();
            if p.is_empty() {
                return None;
            }

            let without_default = p.split('=').next().unwrap_or(p).trim();
            let mut parts = without_default.splitn(2, ':');
            let name = parts
                .next()
                .unwrap_or(without_default)
                .trim()
                .trim_start_matches("...")
                .trim_end_matches('?')
                .to_string();
            if name.is_empty() {
                return None;
            }

            let annotation = parts.next().map(|t| t.trim().to_string());
            Some(ParamInfo { name, annotation })
        })
        .collect()
}

/// Strip `/** ... */` delimiters and leading `*` gutters
fn clean_jsdoc(raw: &str) -> String {
    raw.trim_start_matches("/**")
        .trim_end_matches("*/")
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ModuleInfo {
        TypeScriptParser::new(Language::TypeScript)
            .unwrap()
            .parse("src/sample.ts", content)
            .unwrap()
    }

    #[test]
    fn test_function_with_jsdoc() {
        let module = parse(
            "/** Formats a name. */\nexport function format(name: string, width: number = 10): string {\n  return name;\n}\n",
        );

        assert_eq!(module.functions.len(), 1);
        let f = &module.functions[0];
        assert_eq!(f.name, "format");
        assert_eq!(f.docstring.as_deref(), Some("Formats a name."));
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].annotation.as_deref(), Some("string"));
        assert_eq!(f.return_annotation.as_deref(), Some("string"));
    }

    #[test]
    fn test_async_arrow_binding() {
        let module = parse("export const load = async (key: string) => {\n  return key;\n};\n");

        assert_eq!(module.functions.len(), 1);
        let f = &module.functions[0];
        assert_eq!(f.name, "load");
        assert!(f.is_async);
        assert_eq!(f.params.len(), 1);
    }

    #[test]
    fn test_class_extraction() {
        let module = parse(
            r#"/** In-memory store. */
export class Store extends Base {
  capacity = 10;

  /** Put a value. */
  put(key: string, value: string): void {}

  async get(key: string): Promise<string> {
    return "";
  }
}
"#,
        );

        assert_eq!(module.classes.len(), 1);
        let class = &module.classes[0];
        assert_eq!(class.name, "Store");
        assert_eq!(class.docstring.as_deref(), Some("In-memory store."));
        assert_eq!(class.bases, vec!["Base"]);
        assert_eq!(class.attributes, vec!["capacity"]);
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.methods[0].docstring.as_deref(), Some("Put a value."));
        assert!(class.methods[1].is_async);
    }

    #[test]
    fn test_imports_recorded() {
        let module = parse("import { join } from \"path\";\nimport fs from \"fs\";\n");
        assert_eq!(module.imports.len(), 2);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = TypeScriptParser::new(Language::TypeScript)
            .unwrap()
            .parse("bad.ts", "function {{{");
        assert!(result.is_err());
    }
}
