//! Change Tracker
//!
//! Computes added/modified/removed file sets between two repository
//! revisions (or the worktree vs HEAD) by shelling out to `git`. The diff is
//! a candidate-set optimization only: content identity at the cache layer is
//! the final authority on whether a unit is regenerated, so a file touched
//! but structurally unchanged costs a cache hit, never a wrong answer.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::types::{AutoDocError, Result};

/// Added/modified/removed paths between two revisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Paths that still exist and need (re)processing
    pub fn candidates(&self) -> Vec<String> {
        let mut paths = self.added.clone();
        paths.extend(self.modified.iter().cloned());
        paths
    }
}

pub struct ChangeTracker {
    repo_root: PathBuf,
}

impl ChangeTracker {
    pub fn new<P: AsRef<Path>>(repo_root: P) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
        }
    }

    /// Whether the root is inside a git worktree
    pub fn is_git_repo(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(&self.repo_root)
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Diff two revisions (`git diff --name-status base target`)
    pub fn diff(&self, base: &str, target: &str) -> Result<ChangeSet> {
        self.run_diff(&["diff", "--name-status", base, target])
    }

    /// Worktree (including index) vs HEAD
    pub fn uncommitted(&self) -> Result<ChangeSet> {
        self.run_diff(&["diff", "--name-status", "HEAD"])
    }

    /// Changes introduced by the latest commit
    pub fn last_commit(&self) -> Result<ChangeSet> {
        self.run_diff(&["diff", "--name-status", "HEAD~1", "HEAD"])
    }

    fn run_diff(&self, args: &[&str]) -> Result<ChangeSet> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| AutoDocError::Vcs(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutoDocError::Vcs(format!(
                "git diff failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let changes = parse_name_status(&stdout);
        debug!(
            "git diff: {} added, {} modified, {} removed",
            changes.added.len(),
            changes.modified.len(),
            changes.removed.len()
        );
        Ok(changes)
    }
}

/// Parse `git diff --name-status` output. Renames count as a removal of the
/// old path plus an addition of the new one.
fn parse_name_status(output: &str) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split('\t');
        let Some(status) = parts.next() else { continue };
        let Some(path) = parts.next() else { continue };

        match status.chars().next() {
            Some('A') => changes.added.push(path.to_string()),
            Some('M') => changes.modified.push(path.to_string()),
            Some('D') => changes.removed.push(path.to_string()),
            Some('R') | Some('C') => {
                // R<score>\told\tnew
                if let Some(new_path) = parts.next() {
                    changes.removed.push(path.to_string());
                    changes.added.push(new_path.to_string());
                } else {
                    changes.modified.push(path.to_string());
                }
            }
            _ => changes.modified.push(path.to_string()),
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_status_basic() {
        let output = "A\tsrc/new.py\nM\tsrc/changed.py\nD\tsrc/gone.py\n";
        let changes = parse_name_status(output);

        assert_eq!(changes.added, vec!["src/new.py"]);
        assert_eq!(changes.modified, vec!["src/changed.py"]);
        assert_eq!(changes.removed, vec!["src/gone.py"]);
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_parse_name_status_rename() {
        let output = "R100\tsrc/old.py\tsrc/new.py\n";
        let changes = parse_name_status(output);

        assert_eq!(changes.removed, vec!["src/old.py"]);
        assert_eq!(changes.added, vec!["src/new.py"]);
    }

    #[test]
    fn test_parse_name_status_empty() {
        let changes = parse_name_status("\n\n");
        assert!(changes.is_empty());
        assert!(changes.candidates().is_empty());
    }

    #[test]
    fn test_candidates_excludes_removed() {
        let output = "A\ta.py\nM\tb.py\nD\tc.py\n";
        let changes = parse_name_status(output);
        let candidates = changes.candidates();

        assert!(candidates.contains(&"a.py".to_string()));
        assert!(candidates.contains(&"b.py".to_string()));
        assert!(!candidates.contains(&"c.py".to_string()));
    }

    #[test]
    fn test_is_git_repo_false_outside_repo() {
        let temp = tempfile::TempDir::new().unwrap();
        let tracker = ChangeTracker::new(temp.path());
        // Either git is absent or the directory is not a repository
        assert!(!tracker.is_git_repo() || temp.path().join(".git").exists());
    }
}
