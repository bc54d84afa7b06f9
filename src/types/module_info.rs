//! Structural Metadata Types
//!
//! The per-file extraction results produced by the analyzer. All types are
//! immutable once produced; a re-scan replaces them wholesale rather than
//! mutating in place.

use serde::{Deserialize, Serialize};

/// A single function/method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    /// Type annotation, when the source declares one
    pub annotation: Option<String>,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }

    pub fn with_annotation(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation.into()),
        }
    }
}

/// Information about one function or method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub return_annotation: Option<String>,
    pub docstring: Option<String>,
    pub is_async: bool,
    /// 1-based (start, end) line span in the source file
    pub line_span: (u32, u32),
    /// Functions/classes declared inside this function's body. Never hoisted
    /// to module level.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<FunctionInfo>,
}

impl FunctionInfo {
    /// Render `name(p1, p2: T) -> R` for prompts, templates, and indexes
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| match &p.annotation {
                Some(a) => format!("{}: {}", p.name, a),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        match &self.return_annotation {
            Some(ret) => format!("{}({}) -> {}", self.name, params, ret),
            None => format!("{}({})", self.name, params),
        }
    }

    /// Stable structural identity used for cache keys. Includes the name and
    /// full signature so a rename produces a different identity.
    pub fn fingerprint(&self) -> String {
        format!(
            "fn|{}|{}|{}|{}",
            self.signature(),
            self.is_async,
            self.docstring.as_deref().unwrap_or(""),
            self.nested
                .iter()
                .map(FunctionInfo::fingerprint)
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

/// Information about one class with its methods and attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub docstring: Option<String>,
    pub methods: Vec<FunctionInfo>,
    pub attributes: Vec<String>,
    pub bases: Vec<String>,
    pub line_span: (u32, u32),
}

impl ClassInfo {
    pub fn fingerprint(&self) -> String {
        format!(
            "class|{}|{}|{}|{}|{}",
            self.name,
            self.bases.join(","),
            self.docstring.as_deref().unwrap_or(""),
            self.attributes.join(","),
            self.methods
                .iter()
                .map(FunctionInfo::fingerprint)
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

/// Structural description of one analyzable source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Path relative to the repository root
    pub path: String,
    pub docstring: Option<String>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<String>,
}

impl ModuleInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            docstring: None,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Stable structural identity of the whole file. The path is part of the
    /// identity, so a moved-but-unchanged file is a fresh unit.
    pub fn fingerprint(&self) -> String {
        format!(
            "module|{}|{}|{}|{}|{}",
            self.path,
            self.docstring.as_deref().unwrap_or(""),
            self.imports.join(","),
            self.functions
                .iter()
                .map(FunctionInfo::fingerprint)
                .collect::<Vec<_>>()
                .join(";"),
            self.classes
                .iter()
                .map(ClassInfo::fingerprint)
                .collect::<Vec<_>>()
                .join(";"),
        )
    }

    /// Total number of documentable declarations in this module
    pub fn declaration_count(&self) -> usize {
        self.functions.len()
            + self
                .classes
                .iter()
                .map(|c| c.methods.len() + 1)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fn(name: &str) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            params: vec![
                ParamInfo::new("a"),
                ParamInfo::with_annotation("b", "int"),
            ],
            return_annotation: Some("str".to_string()),
            docstring: Some("Does a thing.".to_string()),
            is_async: false,
            line_span: (1, 4),
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_signature_rendering() {
        let f = sample_fn("build");
        assert_eq!(f.signature(), "build(a, b: int) -> str");

        let bare = FunctionInfo {
            name: "run".to_string(),
            params: vec![],
            return_annotation: None,
            docstring: None,
            is_async: true,
            line_span: (1, 1),
            nested: Vec::new(),
        };
        assert_eq!(bare.signature(), "run()");
    }

    #[test]
    fn test_fingerprint_changes_with_rename() {
        let a = sample_fn("alpha");
        let mut b = a.clone();
        b.name = "beta".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_module_fingerprint_includes_path() {
        let mut m1 = ModuleInfo::new("src/a.py");
        m1.functions.push(sample_fn("f"));
        let mut m2 = m1.clone();
        m2.path = "src/b.py".to_string();
        assert_ne!(m1.fingerprint(), m2.fingerprint());
    }

    #[test]
    fn test_fingerprint_stable_for_identical_structure() {
        let mut m1 = ModuleInfo::new("src/a.py");
        m1.functions.push(sample_fn("f"));
        let m2 = m1.clone();
        assert_eq!(m1.fingerprint(), m2.fingerprint());
    }

    #[test]
    fn test_declaration_count() {
        let mut m = ModuleInfo::new("src/a.py");
        m.functions.push(sample_fn("f"));
        m.classes.push(ClassInfo {
            name: "C".to_string(),
            docstring: None,
            methods: vec![sample_fn("m1"), sample_fn("m2")],
            attributes: vec!["x".to_string()],
            bases: vec![],
            line_span: (1, 10),
        });
        assert_eq!(m.declaration_count(), 4);
    }
}
