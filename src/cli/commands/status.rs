//! Status Command
//!
//! Show configuration, hook installation, documentation coverage, and cache
//! state. With `--check-stale`, exits non-zero when any source file is
//! newer than its documentation (used by the pre-push hook).

use std::path::PathBuf;

use crate::ai::GenerationCache;
use crate::cli::commands::analyze::load_for_repo;
use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::types::{AutoDocError, Result};
use crate::vcs::{HookManager, stale_files};

pub fn run(repo: PathBuf, check_stale: bool, quiet: bool) -> Result<()> {
    let output = Output::new(quiet);
    let config = load_for_repo(&repo)?;

    let stale = stale_files(&repo, &config)?;

    if check_stale {
        if stale.is_empty() {
            output.success("Documentation is up to date");
            return Ok(());
        }
        return Err(AutoDocError::Config(format!(
            "Documentation is stale for {} file(s); run 'autodocs update'",
            stale.len()
        )));
    }

    output.section("Configuration");
    let project_config = repo.join(ConfigLoader::project_config_path());
    if project_config.exists() {
        println!("  Project config: {}", project_config.display());
    } else {
        println!("  Project config: none (using defaults; run 'autodocs init')");
    }
    println!("  Provider: {}", config.generation.provider);
    println!("  Model: {}", config.generation.model);
    println!(
        "  Rate limit: {} requests / {}s",
        config.generation.rate.max_requests, config.generation.rate.window_secs
    );

    output.section("Git hooks");
    let hooks = HookManager::new(&repo);
    for (kind, installed) in hooks.status() {
        println!("  {} {}", if installed { "✓" } else { "✗" }, kind);
    }

    output.section("Documentation");
    let mut output_dir = config.output.dir.clone();
    if output_dir.is_relative() {
        output_dir = repo.join(output_dir);
    }
    if output_dir.exists() {
        let count = count_docs(&output_dir);
        println!("  Output dir: {} ({} documents)", output_dir.display(), count);
    } else {
        println!("  Output dir: {} (not generated yet)", output_dir.display());
    }
    if stale.is_empty() {
        println!("  Staleness: up to date");
    } else {
        println!("  Staleness: {} source file(s) newer than docs", stale.len());
        for path in stale.iter().take(5) {
            println!("    {}", path);
        }
        if stale.len() > 5 {
            println!("    ... and {} more", stale.len() - 5);
        }
    }

    output.section("Cache");
    let mut cache_config = config.cache.clone();
    if cache_config.dir.is_relative() {
        cache_config.dir = repo.join(&cache_config.dir);
    }
    let cache = GenerationCache::new(&cache_config);
    println!("  Entries: {}", cache.len());
    println!("  Dir: {}", cache_config.dir.display());

    Ok(())
}

fn count_docs(dir: &std::path::Path) -> usize {
    ignore::WalkBuilder::new(dir)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .count()
}
