//! Git Hook Management
//!
//! Installs and removes the shell hooks that trigger documentation updates:
//! `post-commit` runs an incremental update after each commit, `pre-push`
//! refuses the push when documentation is stale. An existing hook is backed
//! up before being replaced and restored on uninstall.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::types::{AutoDocError, Result};

/// Marker identifying hooks written by this tool
const HOOK_MARKER: &str = "# autodocs hook";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PostCommit,
    PrePush,
}

impl HookKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::PostCommit => "post-commit",
            Self::PrePush => "pre-push",
        }
    }

    pub const ALL: [HookKind; 2] = [HookKind::PostCommit, HookKind::PrePush];
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

pub struct HookManager {
    repo_root: PathBuf,
}

impl HookManager {
    pub fn new<P: AsRef<Path>>(repo_root: P) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
        }
    }

    fn hooks_dir(&self) -> PathBuf {
        self.repo_root.join(".git").join("hooks")
    }

    fn hook_path(&self, kind: HookKind) -> PathBuf {
        self.hooks_dir().join(kind.file_name())
    }

    fn backup_path(&self, kind: HookKind) -> PathBuf {
        self.hooks_dir().join(format!("{}.backup", kind.file_name()))
    }

    /// Install a hook, backing up any existing one first
    pub fn install(&self, kind: HookKind) -> Result<()> {
        let hooks_dir = self.hooks_dir();
        if !hooks_dir.exists() {
            return Err(AutoDocError::Hook(format!(
                "Git hooks directory not found: {} (not a git repository?)",
                hooks_dir.display()
            )));
        }

        let hook_path = self.hook_path(kind);
        if hook_path.exists() {
            let existing = fs::read_to_string(&hook_path).unwrap_or_default();
            if !existing.contains(HOOK_MARKER) {
                fs::copy(&hook_path, self.backup_path(kind))?;
                info!("Existing {} hook backed up", kind);
            }
        }

        fs::write(&hook_path, hook_script(kind))?;
        make_executable(&hook_path)?;

        info!("Installed {} hook", kind);
        Ok(())
    }

    /// Remove our hook and restore any backup
    pub fn uninstall(&self, kind: HookKind) -> Result<()> {
        let hook_path = self.hook_path(kind);

        if hook_path.exists() {
            let existing = fs::read_to_string(&hook_path).unwrap_or_default();
            if !existing.contains(HOOK_MARKER) {
                return Err(AutoDocError::Hook(format!(
                    "{} hook was not installed by autodocs; refusing to remove",
                    kind
                )));
            }
            fs::remove_file(&hook_path)?;
            info!("Removed {} hook", kind);
        }

        let backup = self.backup_path(kind);
        if backup.exists() {
            fs::rename(&backup, &hook_path)?;
            info!("Restored previous {} hook from backup", kind);
        }

        Ok(())
    }

    /// Whether our hook is currently installed for each kind
    pub fn status(&self) -> Vec<(HookKind, bool)> {
        HookKind::ALL
            .iter()
            .map(|kind| {
                let installed = fs::read_to_string(self.hook_path(*kind))
                    .map(|content| content.contains(HOOK_MARKER))
                    .unwrap_or(false);
                (*kind, installed)
            })
            .collect()
    }
}

fn hook_script(kind: HookKind) -> String {
    match kind {
        HookKind::PostCommit => format!(
            "#!/bin/sh\n{marker}\n\
             # Regenerate documentation for files changed by this commit.\n\
             \n\
             # Skip during rebase/merge to avoid churning half-applied trees\n\
             if [ -f .git/REBASE_HEAD ] || [ -f .git/MERGE_HEAD ]; then\n\
             \texit 0\n\
             fi\n\
             \n\
             if command -v autodocs >/dev/null 2>&1; then\n\
             \tautodocs update --quiet || echo \"autodocs: documentation update failed\"\n\
             fi\n\
             exit 0\n",
            marker = HOOK_MARKER
        ),
        HookKind::PrePush => format!(
            "#!/bin/sh\n{marker}\n\
             # Refuse to push when documentation is stale.\n\
             \n\
             if command -v autodocs >/dev/null 2>&1; then\n\
             \tif ! autodocs status --check-stale --quiet; then\n\
             \t\techo \"autodocs: documentation is stale; run 'autodocs update' first\"\n\
             \t\texit 1\n\
             \tfi\n\
             fi\n\
             exit 0\n",
            marker = HOOK_MARKER
        ),
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git/hooks")).unwrap();
        temp
    }

    #[test]
    fn test_install_writes_marked_script() {
        let temp = git_repo();
        let manager = HookManager::new(temp.path());

        manager.install(HookKind::PostCommit).unwrap();

        let script =
            fs::read_to_string(temp.path().join(".git/hooks/post-commit")).unwrap();
        assert!(script.contains(HOOK_MARKER));
        assert!(script.contains("autodocs update"));
    }

    #[test]
    fn test_install_fails_outside_git_repo() {
        let temp = TempDir::new().unwrap();
        let manager = HookManager::new(temp.path());
        assert!(manager.install(HookKind::PostCommit).is_err());
    }

    #[test]
    fn test_install_backs_up_foreign_hook() {
        let temp = git_repo();
        fs::write(
            temp.path().join(".git/hooks/post-commit"),
            "#!/bin/sh\necho custom\n",
        )
        .unwrap();

        let manager = HookManager::new(temp.path());
        manager.install(HookKind::PostCommit).unwrap();

        let backup =
            fs::read_to_string(temp.path().join(".git/hooks/post-commit.backup")).unwrap();
        assert!(backup.contains("echo custom"));
    }

    #[test]
    fn test_uninstall_restores_backup() {
        let temp = git_repo();
        fs::write(
            temp.path().join(".git/hooks/pre-push"),
            "#!/bin/sh\necho original\n",
        )
        .unwrap();

        let manager = HookManager::new(temp.path());
        manager.install(HookKind::PrePush).unwrap();
        manager.uninstall(HookKind::PrePush).unwrap();

        let restored = fs::read_to_string(temp.path().join(".git/hooks/pre-push")).unwrap();
        assert!(restored.contains("echo original"));
        assert!(!temp.path().join(".git/hooks/pre-push.backup").exists());
    }

    #[test]
    fn test_uninstall_refuses_foreign_hook() {
        let temp = git_repo();
        fs::write(
            temp.path().join(".git/hooks/post-commit"),
            "#!/bin/sh\necho theirs\n",
        )
        .unwrap();

        let manager = HookManager::new(temp.path());
        assert!(manager.uninstall(HookKind::PostCommit).is_err());
    }

    #[test]
    fn test_status_reflects_installation() {
        let temp = git_repo();
        let manager = HookManager::new(temp.path());

        let before = manager.status();
        assert!(before.iter().all(|(_, installed)| !installed));

        manager.install(HookKind::PostCommit).unwrap();
        let after = manager.status();
        assert!(
            after
                .iter()
                .any(|(kind, installed)| *kind == HookKind::PostCommit && *installed)
        );
    }
}
