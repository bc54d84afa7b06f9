//! Template Fallback Generation
//!
//! Deterministic documentation built purely from structural metadata, used
//! when the generation capability is unavailable or exhausted. These
//! builders are total: they always produce non-empty text and never fail.

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo};

/// Markdown section for one function
pub fn function_fallback(func: &FunctionInfo) -> String {
    let mut doc = format!("### `{}`\n\n", func.signature());

    if func.is_async {
        doc.push_str("*Asynchronous.*\n\n");
    }

    match &func.docstring {
        Some(docstring) => {
            doc.push_str(docstring);
            doc.push_str("\n\n");
        }
        None => {
            doc.push_str(&format!(
                "Function `{}` with {} parameter{}.\n\n",
                func.name,
                func.params.len(),
                if func.params.len() == 1 { "" } else { "s" }
            ));
        }
    }

    if let Some(ret) = &func.return_annotation {
        doc.push_str(&format!("**Returns:** `{}`\n\n", ret));
    }

    if !func.nested.is_empty() {
        let names: Vec<&str> = func.nested.iter().map(|f| f.name.as_str()).collect();
        doc.push_str(&format!("**Inner definitions:** {}\n\n", names.join(", ")));
    }

    doc
}

/// Markdown section for one class
pub fn class_fallback(class: &ClassInfo) -> String {
    let mut doc = format!("### `{}`\n\n", class.name);

    match &class.docstring {
        Some(docstring) => {
            doc.push_str(docstring);
            doc.push_str("\n\n");
        }
        None => {
            doc.push_str(&format!(
                "Class `{}` with {} method{}.\n\n",
                class.name,
                class.methods.len(),
                if class.methods.len() == 1 { "" } else { "s" }
            ));
        }
    }

    if !class.bases.is_empty() {
        doc.push_str(&format!("**Extends:** {}\n\n", class.bases.join(", ")));
    }

    if !class.attributes.is_empty() {
        doc.push_str(&format!(
            "**Attributes:** {}\n\n",
            class.attributes.join(", ")
        ));
    }

    for method in &class.methods {
        doc.push_str(&format!("- `{}`", method.signature()));
        if let Some(docstring) = &method.docstring {
            let first_line = docstring.lines().next().unwrap_or("");
            doc.push_str(&format!(" — {}", first_line));
        }
        doc.push('\n');
    }
    if !class.methods.is_empty() {
        doc.push('\n');
    }

    doc
}

/// Markdown overview for one file
pub fn file_fallback(module: &ModuleInfo) -> String {
    let file_name = module.path.rsplit('/').next().unwrap_or(&module.path);
    let mut doc = format!("# {}\n\n", file_name);

    if let Some(docstring) = &module.docstring {
        doc.push_str(docstring);
        doc.push_str("\n\n");
    } else {
        doc.push_str(&format!(
            "Source module `{}` with {} function{} and {} class{}.\n\n",
            module.path,
            module.functions.len(),
            if module.functions.len() == 1 { "" } else { "s" },
            module.classes.len(),
            if module.classes.len() == 1 { "" } else { "es" },
        ));
    }

    if !module.imports.is_empty() {
        doc.push_str("**Dependencies:**\n\n");
        for import in module.imports.iter().take(10) {
            doc.push_str(&format!("- `{}`\n", import));
        }
        doc.push('\n');
    }

    doc
}

/// Markdown project overview from all file summaries
pub fn overview_fallback(modules: &[ModuleInfo], project_name: &str) -> String {
    let mut doc = format!("# {}\n\n", project_name);
    doc.push_str("Automatically generated project documentation.\n\n");
    doc.push_str("## Modules\n\n");

    for module in modules {
        doc.push_str(&format!(
            "- **{}**: {} function{}, {} class{}\n",
            module.path,
            module.functions.len(),
            if module.functions.len() == 1 { "" } else { "s" },
            module.classes.len(),
            if module.classes.len() == 1 { "" } else { "es" },
        ));
    }

    doc.push('\n');
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamInfo;

    fn sample_fn() -> FunctionInfo {
        FunctionInfo {
            name: "load".to_string(),
            params: vec![ParamInfo::with_annotation("key", "str")],
            return_annotation: Some("dict".to_string()),
            docstring: None,
            is_async: true,
            line_span: (1, 3),
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_function_fallback_is_nonempty_without_docstring() {
        let doc = function_fallback(&sample_fn());
        assert!(doc.contains("load(key: str) -> dict"));
        assert!(doc.contains("Asynchronous"));
        assert!(doc.contains("Returns"));
        assert!(!doc.trim().is_empty());
    }

    #[test]
    fn test_function_fallback_prefers_docstring() {
        let mut func = sample_fn();
        func.docstring = Some("Loads a record.".to_string());
        let doc = function_fallback(&func);
        assert!(doc.contains("Loads a record."));
    }

    #[test]
    fn test_class_fallback_lists_methods() {
        let class = ClassInfo {
            name: "Store".to_string(),
            docstring: Some("Key-value store.".to_string()),
            methods: vec![sample_fn()],
            attributes: vec!["capacity".to_string()],
            bases: vec!["Base".to_string()],
            line_span: (1, 10),
        };
        let doc = class_fallback(&class);
        assert!(doc.contains("Key-value store."));
        assert!(doc.contains("**Extends:** Base"));
        assert!(doc.contains("capacity"));
        assert!(doc.contains("load(key: str) -> dict"));
    }

    #[test]
    fn test_file_fallback_always_nonempty() {
        let module = ModuleInfo::new("src/empty.py");
        let doc = file_fallback(&module);
        assert!(doc.contains("empty.py"));
        assert!(!doc.trim().is_empty());
    }

    #[test]
    fn test_overview_fallback_lists_all_modules() {
        let modules = vec![ModuleInfo::new("a.py"), ModuleInfo::new("b.py")];
        let doc = overview_fallback(&modules, "demo");
        assert!(doc.contains("# demo"));
        assert!(doc.contains("a.py"));
        assert!(doc.contains("b.py"));
    }

    #[test]
    fn test_templates_are_deterministic() {
        let module = ModuleInfo::new("src/x.py");
        assert_eq!(file_fallback(&module), file_fallback(&module));
    }
}
