//! Config Command
//!
//! Inspect the resolved configuration and the paths it is loaded from.

use std::path::Path;

use crate::cli::commands::analyze::load_for_repo;
use crate::config::ConfigLoader;
use crate::types::{AutoDocError, Result};

/// Print the merged effective configuration as TOML. The API key is never
/// serialized, so it cannot leak here.
pub fn show(repo: &Path) -> Result<()> {
    let config = load_for_repo(repo)?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| AutoDocError::Config(format!("Failed to render config: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Print the configuration file paths in resolution order
pub fn path(repo: &Path) -> Result<()> {
    match ConfigLoader::global_config_path() {
        Some(global) => println!(
            "Global:  {} ({})",
            global.display(),
            if global.exists() { "present" } else { "absent" }
        ),
        None => println!("Global:  <cannot determine config directory>"),
    }

    let project = repo.join(ConfigLoader::project_config_path());
    println!(
        "Project: {} ({})",
        project.display(),
        if project.exists() { "present" } else { "absent" }
    );

    Ok(())
}
