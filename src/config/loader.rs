//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/autodocs/config.toml)
//! 3. Project config (.autodocs/config.toml)
//! 4. Environment variables (AUTODOCS_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use super::types::Config;
use crate::types::{AutoDocError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // AUTODOCS_GENERATION_MODEL -> generation.model
        figment = figment.merge(Env::prefixed("AUTODOCS_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| AutoDocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| AutoDocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "autodocs").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".autodocs/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".autodocs")
    }

    /// Write a default project config, creating the data directory
    pub fn init_project(root: &Path, force: bool) -> Result<PathBuf> {
        let dir = root.join(Self::project_dir());
        let path = dir.join("config.toml");

        if path.exists() && !force {
            return Err(AutoDocError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| AutoDocError::Config(format!("Failed to render config: {}", e)))?;
        fs::write(&path, content)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[generation]
model = "custom-model"
temperature = 0.1

[output]
dir = "handbook"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.generation.model, "custom-model");
        assert_eq!(config.output.dir, PathBuf::from("handbook"));
        // Untouched sections keep their defaults
        assert_eq!(config.analysis.chunk_size, 15);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[generation]\ntemperature = 9.0\n").unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_init_project_writes_config() {
        let temp = TempDir::new().unwrap();
        let path = ConfigLoader::init_project(temp.path(), false).unwrap();
        assert!(path.exists());

        // Second init without force fails
        assert!(ConfigLoader::init_project(temp.path(), false).is_err());
        // With force succeeds
        assert!(ConfigLoader::init_project(temp.path(), true).is_ok());
    }
}
