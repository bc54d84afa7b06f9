//! Init Command
//!
//! Scaffold project configuration and the documentation directory.

use std::fs;
use std::path::PathBuf;

use crate::cli::output::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

pub fn run(repo: PathBuf, force: bool, quiet: bool) -> Result<()> {
    let output = Output::new(quiet);

    let config_path = ConfigLoader::init_project(&repo, force)?;
    output.success(&format!("Wrote {}", config_path.display()));

    let docs_dir = repo.join(Config::default().output.dir);
    fs::create_dir_all(&docs_dir)?;
    output.success(&format!("Created {}", docs_dir.display()));

    output.info("Set GROQ_API_KEY to enable AI generation");
    output.info("Run 'autodocs hook install' to regenerate docs on commit");
    output.info("Run 'autodocs analyze' to generate documentation");

    Ok(())
}
