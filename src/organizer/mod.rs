//! Documentation Organizer
//!
//! Arranges generated documentation units into an output folder hierarchy
//! mirroring the source tree, and builds a navigation index per folder.
//!
//! The tree is rebuilt from the current module set on every pass; partial
//! index updates are a known source of navigation drift, so incremental
//! tree edits are not supported. Incrementality applies only to which leaf
//! contents get regenerated, never to tree assembly.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::types::{ModuleInfo, Result};

/// One folder or leaf document in the output tree
#[derive(Debug, Clone)]
pub struct DocNode {
    /// Final path segment ("" for the root)
    pub name: String,
    /// Path relative to the output root
    pub rel_path: String,
    /// Ordered children: directories before files, then lexicographic
    pub children: Vec<DocNode>,
    /// For leaves: the source module path whose content this document holds
    pub source: Option<String>,
}

impl DocNode {
    pub fn is_leaf(&self) -> bool {
        self.source.is_some()
    }

    /// All leaves reachable from this node, depth first
    pub fn leaves(&self) -> Vec<&DocNode> {
        let mut result = Vec::new();
        if self.is_leaf() {
            result.push(self);
        }
        for child in &self.children {
            result.extend(child.leaves());
        }
        result
    }
}

/// Intermediate mutable tree used during assembly
#[derive(Default)]
struct TreeBuilder {
    dirs: BTreeMap<String, TreeBuilder>,
    files: BTreeMap<String, String>,
}

impl TreeBuilder {
    fn insert(&mut self, segments: &[&str], doc_name: String, source: String) {
        match segments {
            [] => {}
            [_leaf] => {
                self.files.insert(doc_name, source);
            }
            [dir, rest @ ..] => {
                self.dirs
                    .entry(dir.to_string())
                    .or_default()
                    .insert(rest, doc_name, source);
            }
        }
    }

    fn build(self, name: String, rel_path: String) -> DocNode {
        let mut children = Vec::new();

        // Directories first, then files; BTreeMap keeps each group sorted
        for (dir_name, subtree) in self.dirs {
            let child_path = join_rel(&rel_path, &dir_name);
            children.push(subtree.build(dir_name, child_path));
        }
        for (file_name, source) in self.files {
            let child_path = join_rel(&rel_path, &file_name);
            children.push(DocNode {
                name: file_name,
                rel_path: child_path,
                children: Vec::new(),
                source: Some(source),
            });
        }

        DocNode {
            name,
            rel_path,
            children,
            source: None,
        }
    }
}

fn join_rel(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", base, segment)
    }
}

pub struct DocumentationOrganizer {
    output_root: PathBuf,
    extension: String,
}

impl DocumentationOrganizer {
    pub fn new<P: AsRef<Path>>(output_root: P, extension: impl Into<String>) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// Build the documentation tree from scratch for the current module set
    pub fn organize(&self, modules: &[ModuleInfo]) -> DocNode {
        let mut builder = TreeBuilder::default();

        for module in modules {
            let segments: Vec<&str> = module.path.split('/').collect();
            let Some(file_name) = segments.last() else {
                continue;
            };
            let doc_name = replace_extension(file_name, &self.extension);
            builder.insert(&segments, doc_name, module.path.clone());
        }

        builder.build(String::new(), String::new())
    }

    /// Write leaf documents and per-folder indexes. The organizer is the
    /// sole writer of the output directory. Files whose content is already
    /// identical are left untouched.
    pub fn write(
        &self,
        tree: &DocNode,
        contents: &HashMap<String, String>,
        overview: Option<&str>,
    ) -> Result<usize> {
        fs::create_dir_all(&self.output_root)?;
        let mut written = 0usize;
        self.write_node(tree, contents, overview, &mut written)?;
        info!(
            "Documentation written to {} ({} files updated)",
            self.output_root.display(),
            written
        );
        Ok(written)
    }

    fn write_node(
        &self,
        node: &DocNode,
        contents: &HashMap<String, String>,
        overview: Option<&str>,
        written: &mut usize,
    ) -> Result<()> {
        if let Some(source) = &node.source {
            if let Some(content) = contents.get(source) {
                let path = self.output_root.join(&node.rel_path);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                if write_if_changed(&path, content)? {
                    *written += 1;
                }
            } else {
                debug!("No content for leaf {}, skipping", node.rel_path);
            }
            return Ok(());
        }

        let dir = self.output_root.join(&node.rel_path);
        fs::create_dir_all(&dir)?;

        let index = self.render_index(node, if node.rel_path.is_empty() {
            overview
        } else {
            None
        });
        if write_if_changed(&dir.join("README.md"), &index)? {
            *written += 1;
        }

        for child in &node.children {
            self.write_node(child, contents, overview, written)?;
        }

        Ok(())
    }

    /// Folder index: the project overview (root only) followed by links to
    /// exactly the immediate children, directories before files.
    fn render_index(&self, node: &DocNode, overview: Option<&str>) -> String {
        let title = if node.name.is_empty() {
            "Documentation".to_string()
        } else {
            node.name.clone()
        };

        let mut index = match overview {
            Some(text) => format!("{}\n\n## Contents\n\n", text.trim_end()),
            None => format!("# {}\n\n", title),
        };

        for child in &node.children {
            if child.is_leaf() {
                index.push_str(&format!("- [{}]({})\n", child.name, child.name));
            } else {
                index.push_str(&format!("- [{}/]({}/README.md)\n", child.name, child.name));
            }
        }

        index
    }
}

/// `foo.py` → `foo.md`
fn replace_extension(file_name: &str, extension: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.{}", stem, extension),
        None => format!("{}.{}", file_name, extension),
    }
}

/// Write only when content differs; reports whether a write happened
fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path)
        && existing == content
    {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}
