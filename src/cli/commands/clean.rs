//! Clean Command
//!
//! Remove cached generation results and/or generated documentation.

use std::fs;
use std::path::PathBuf;

use crate::ai::GenerationCache;
use crate::cli::commands::analyze::load_for_repo;
use crate::cli::output::Output;
use crate::types::Result;

pub fn run(repo: PathBuf, cache: bool, docs: bool, all: bool, quiet: bool) -> Result<()> {
    let output = Output::new(quiet);
    let config = load_for_repo(&repo)?;

    let clean_cache = cache || all;
    let clean_docs = docs || all;

    if !clean_cache && !clean_docs {
        output.info("Nothing selected; use --cache, --docs, or --all");
        return Ok(());
    }

    if clean_cache {
        let mut cache_config = config.cache.clone();
        if cache_config.dir.is_relative() {
            cache_config.dir = repo.join(&cache_config.dir);
        }
        let store = GenerationCache::new(&cache_config);
        let removed = store.clear();
        output.success(&format!("Cleared {} cache entries", removed));
    }

    if clean_docs {
        let mut output_dir = config.output.dir.clone();
        if output_dir.is_relative() {
            output_dir = repo.join(output_dir);
        }
        if output_dir.exists() {
            fs::remove_dir_all(&output_dir)?;
            output.success(&format!("Removed {}", output_dir.display()));
        } else {
            output.info("No documentation directory to remove");
        }
    }

    Ok(())
}
