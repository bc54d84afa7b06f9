//! Hook Command
//!
//! Install, remove, and inspect the git hooks that keep documentation
//! current.

use std::path::PathBuf;

use crate::cli::output::Output;
use crate::types::{AutoDocError, Result};
use crate::vcs::{HookKind, HookManager};

fn parse_kind(name: &str) -> Result<Vec<HookKind>> {
    match name {
        "post-commit" => Ok(vec![HookKind::PostCommit]),
        "pre-push" => Ok(vec![HookKind::PrePush]),
        "all" => Ok(HookKind::ALL.to_vec()),
        other => Err(AutoDocError::Config(format!(
            "Unknown hook type '{}'. Valid: post-commit, pre-push, all",
            other
        ))),
    }
}

pub fn install(repo: PathBuf, kind: &str, quiet: bool) -> Result<()> {
    let output = Output::new(quiet);
    let manager = HookManager::new(&repo);

    for kind in parse_kind(kind)? {
        manager.install(kind)?;
        output.success(&format!("Installed {} hook", kind));
    }
    Ok(())
}

pub fn uninstall(repo: PathBuf, kind: &str, quiet: bool) -> Result<()> {
    let output = Output::new(quiet);
    let manager = HookManager::new(&repo);

    for kind in parse_kind(kind)? {
        manager.uninstall(kind)?;
        output.success(&format!("Removed {} hook", kind));
    }
    Ok(())
}

pub fn status(repo: PathBuf) -> Result<()> {
    let manager = HookManager::new(&repo);
    for (kind, installed) in manager.status() {
        println!(
            "{} {}",
            if installed { "✓" } else { "✗" },
            kind
        );
    }
    Ok(())
}
