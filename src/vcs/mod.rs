//! Version Control Integration
//!
//! Git hook installation and documentation staleness checks. The diff-based
//! change tracking itself lives in [`crate::analyzer::change_tracker`].

pub mod hooks;

pub use hooks::{HookKind, HookManager};

use std::path::Path;

use crate::analyzer::RepositoryScanner;
use crate::config::Config;
use crate::types::Result;

/// Source files whose documentation output is missing or older than the
/// source itself. Used by the pre-push hook to refuse pushing stale docs.
pub fn stale_files(repo_root: &Path, config: &Config) -> Result<Vec<String>> {
    let scanner = RepositoryScanner::with_config(repo_root, &config.analysis);
    let sources = scanner.paths()?;

    let mut output_dir = config.output.dir.clone();
    if output_dir.is_relative() {
        output_dir = repo_root.join(output_dir);
    }

    let mut stale = Vec::new();
    for source in sources {
        let doc_rel = match source.rsplit_once('.') {
            Some((stem, _)) => format!("{}.{}", stem, config.output.extension),
            None => format!("{}.{}", source, config.output.extension),
        };
        let doc_path = output_dir.join(&doc_rel);
        let source_path = repo_root.join(&source);

        let doc_mtime = doc_path.metadata().and_then(|m| m.modified()).ok();
        let source_mtime = source_path.metadata().and_then(|m| m.modified()).ok();

        match (source_mtime, doc_mtime) {
            (Some(src), Some(doc)) if src > doc => stale.push(source),
            (Some(_), None) => stale.push(source),
            _ => {}
        }
    }

    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_stale_files_detects_missing_docs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/a.py"), "def f():\n    pass\n").unwrap();

        let mut config = Config::default();
        config.output.dir = temp.path().join("docs");

        let stale = stale_files(temp.path(), &config).unwrap();
        assert_eq!(stale, vec!["src/a.py"]);
    }

    #[test]
    fn test_stale_files_empty_when_docs_current() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/a.py"), "def f():\n    pass\n").unwrap();
        fs::create_dir_all(temp.path().join("docs/src")).unwrap();
        fs::write(temp.path().join("docs/src/a.md"), "# docs").unwrap();

        let mut config = Config::default();
        config.output.dir = temp.path().join("docs");

        let stale = stale_files(temp.path(), &config).unwrap();
        assert!(stale.is_empty());
    }
}
