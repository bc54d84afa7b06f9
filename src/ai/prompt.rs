//! Prompt Construction
//!
//! Thin, replaceable layer that renders a unit's structural fields into a
//! prompt for the completion provider. The wording here shapes output
//! quality only; pipeline correctness never depends on it.

use crate::types::{ClassInfo, FunctionInfo, ModuleInfo};

pub const SYSTEM_MESSAGE: &str = "You are a technical documentation expert. \
    Write clear, accurate Markdown documentation for source code based on \
    the structural metadata provided. Do not invent behavior that is not \
    implied by the names, signatures, and docstrings given.";

pub fn function_prompt(module_path: &str, func: &FunctionInfo) -> String {
    let mut prompt = format!(
        "Document this function from `{}`:\n\n\
         Signature: `{}`\n\
         Asynchronous: {}\n",
        module_path,
        func.signature(),
        if func.is_async { "yes" } else { "no" },
    );

    if let Some(docstring) = &func.docstring {
        prompt.push_str(&format!("Existing docstring:\n{}\n", docstring));
    }

    prompt.push_str(
        "\nWrite a concise Markdown section covering purpose, parameters, \
         return value, and notable edge cases.",
    );
    prompt
}

pub fn class_prompt(module_path: &str, class: &ClassInfo) -> String {
    let methods: Vec<String> = class.methods.iter().map(|m| m.signature()).collect();

    let mut prompt = format!(
        "Document this class from `{}`:\n\n\
         Name: `{}`\n\
         Bases: {}\n\
         Attributes: {}\n\
         Methods:\n{}\n",
        module_path,
        class.name,
        if class.bases.is_empty() {
            "none".to_string()
        } else {
            class.bases.join(", ")
        },
        if class.attributes.is_empty() {
            "none".to_string()
        } else {
            class.attributes.join(", ")
        },
        methods
            .iter()
            .map(|m| format!("- {}", m))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if let Some(docstring) = &class.docstring {
        prompt.push_str(&format!("\nExisting docstring:\n{}\n", docstring));
    }

    prompt.push_str(
        "\nWrite a Markdown section covering the class's purpose, its main \
         methods, and how it relates to its base types.",
    );
    prompt
}

/// File-level synthesis prompt over already-generated unit summaries
pub fn file_prompt(module: &ModuleInfo, unit_summaries: &[String]) -> String {
    let mut prompt = format!(
        "Write a file-level overview for `{}`.\n\n\
         Module docstring: {}\n\
         Imports: {}\n",
        module.path,
        module.docstring.as_deref().unwrap_or("none"),
        if module.imports.is_empty() {
            "none".to_string()
        } else {
            module.imports.join(", ")
        },
    );

    if !unit_summaries.is_empty() {
        prompt.push_str("\nPer-declaration documentation already produced:\n\n");
        for summary in unit_summaries {
            prompt.push_str(summary);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\nSynthesize a short Markdown introduction describing the file's \
         role and how its pieces fit together. Do not repeat the \
         per-declaration sections verbatim.",
    );
    prompt
}

/// Project overview synthesis over all file-level summaries
pub fn overview_prompt(project_name: &str, file_summaries: &[(String, String)]) -> String {
    let mut prompt = format!(
        "Write a project overview (README body) for `{}`.\n\nFiles:\n",
        project_name
    );

    for (path, summary) in file_summaries {
        let first_line = summary.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        prompt.push_str(&format!("- {}: {}\n", path, first_line));
    }

    prompt.push_str(
        "\nProduce Markdown with a short description, a structure overview, \
         and pointers to the most important modules.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamInfo;

    #[test]
    fn test_function_prompt_mentions_signature() {
        let func = FunctionInfo {
            name: "sum".to_string(),
            params: vec![ParamInfo::new("xs")],
            return_annotation: Some("int".to_string()),
            docstring: Some("Adds numbers.".to_string()),
            is_async: false,
            line_span: (1, 2),
            nested: Vec::new(),
        };
        let prompt = function_prompt("src/math.py", &func);
        assert!(prompt.contains("sum(xs) -> int"));
        assert!(prompt.contains("Adds numbers."));
        assert!(prompt.contains("src/math.py"));
    }

    #[test]
    fn test_file_prompt_includes_unit_summaries() {
        let module = ModuleInfo::new("src/a.py");
        let prompt = file_prompt(&module, &["### `f()`\nDoes f.".to_string()]);
        assert!(prompt.contains("Does f."));
    }
}
