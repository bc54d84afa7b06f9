//! Analyze Command
//!
//! Full pipeline run: scan the repository, generate documentation for every
//! candidate file, organize the output tree.

use std::path::{Path, PathBuf};

use crate::cli::output::Output;
use crate::config::{Config, ConfigLoader};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::types::Result;

#[derive(Debug, Default)]
pub struct AnalyzeArgs {
    pub repo: PathBuf,
    pub output: Option<PathBuf>,
    pub max_files: Option<usize>,
    pub chunk_size: Option<usize>,
    pub priority_only: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub dry_run: bool,
    pub quiet: bool,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let output = Output::new(args.quiet);
    let config = load_config(&args)?;

    output.info(&format!("Analyzing repository: {}", args.repo.display()));

    let options = PipelineOptions {
        priority_only: args.priority_only,
        max_files: args.max_files,
        ..Default::default()
    };

    if args.dry_run {
        // Scanning needs no provider, so a missing API key never blocks it
        let pipeline = Pipeline::with_provider(&args.repo, config, None);
        let report = pipeline.scan_only(&options).await?;
        output.section("Scan report");
        println!("  Modules found:   {}", report.modules.len());
        println!("  Parse errors:    {}", report.parse_errors.len());
        println!(
            "  Skipped:         {} ignored, {} too large",
            report.skipped_ignored, report.skipped_too_large
        );
        if report.truncated {
            output.warning("Scan hit the max-files ceiling; listing is partial");
        }
        for module in &report.modules {
            println!("    {}", module.path);
        }
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&args.repo, config)?;
    if pipeline.provider_health().await == Some(false) {
        output.warning("Generation provider unreachable; expect template fallback output");
    }

    let summary = pipeline.run(&options).await?;
    output.summary(&summary);
    output.success(&format!(
        "{} documentation units produced across {} files",
        summary.total_units(),
        summary.analyzed
    ));

    Ok(())
}

fn load_config(args: &AnalyzeArgs) -> Result<Config> {
    let mut config = load_for_repo(&args.repo)?;

    if let Some(dir) = &args.output {
        config.output.dir = dir.clone();
    }
    if let Some(max_files) = args.max_files {
        config.analysis.max_files = Some(max_files);
    }
    if let Some(chunk_size) = args.chunk_size {
        config.analysis.chunk_size = chunk_size;
    }
    if let Some(provider) = &args.provider {
        config.generation.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        config.generation.model = model.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Load config, preferring the project file inside the target repo
pub fn load_for_repo(repo: &Path) -> Result<Config> {
    let project_config = repo.join(ConfigLoader::project_config_path());
    if project_config.exists() {
        ConfigLoader::load_from_file(&project_config)
    } else {
        ConfigLoader::load()
    }
}
