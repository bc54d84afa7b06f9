use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autodocs::cli::commands::{analyze, clean, config_cmd, hook, init, status, update};

#[derive(Parser)]
#[command(name = "autodocs")]
#[command(
    version,
    about = "AI-assisted documentation generator for source repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the repository and generate documentation
    Analyze {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, short, help = "Output directory (default: docs)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Stop after this many files (flags partial output)")]
        max_files: Option<usize>,
        #[arg(long, help = "Files per processing chunk")]
        chunk_size: Option<usize>,
        #[arg(long, help = "Only entry-point and public-surface files")]
        priority_only: bool,
        #[arg(long, help = "Generation provider (groq, none)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Scan and report without generating documentation")]
        dry_run: bool,
    },

    /// Regenerate documentation for changed files only
    Update {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, help = "Diff against this revision instead of HEAD~1")]
        since: Option<String>,
        #[arg(long, help = "Diff the worktree against HEAD")]
        uncommitted: bool,
        #[arg(long, help = "Regenerate everything, ignoring the change set")]
        force: bool,
    },

    /// Initialize configuration in a repository
    Init {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, short, help = "Overwrite existing configuration")]
        force: bool,
    },

    /// Show configuration, hooks, staleness, and cache state
    Status {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, help = "Exit non-zero when documentation is stale")]
        check_stale: bool,
    },

    /// Manage git hooks
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Remove cached results and/or generated documentation
    Clean {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, help = "Clear the generation cache")]
        cache: bool,
        #[arg(long, help = "Remove the documentation directory")]
        docs: bool,
        #[arg(long, help = "Remove everything")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the merged effective configuration
    Show {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
    },
    /// Print the configuration file paths in resolution order
    Path {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
    },
}

#[derive(Subcommand)]
enum HookAction {
    /// Install a git hook (post-commit, pre-push, or all)
    Install {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, default_value = "post-commit", help = "Hook type")]
        kind: String,
    },
    /// Remove an installed hook, restoring any backup
    Uninstall {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
        #[arg(long, default_value = "all", help = "Hook type")]
        kind: String,
    },
    /// Show which hooks are installed
    Status {
        #[arg(long, short, default_value = ".", help = "Repository path")]
        repo: PathBuf,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let quiet = cli.quiet;

    match cli.command {
        Commands::Analyze {
            repo,
            output,
            max_files,
            chunk_size,
            priority_only,
            provider,
            model,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(analyze::run(analyze::AnalyzeArgs {
                repo,
                output,
                max_files,
                chunk_size,
                priority_only,
                provider,
                model,
                dry_run,
                quiet,
            }))?;
        }
        Commands::Update {
            repo,
            since,
            uncommitted,
            force,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(update::run(update::UpdateArgs {
                repo,
                since,
                uncommitted,
                force,
                quiet,
            }))?;
        }
        Commands::Init { repo, force } => {
            init::run(repo, force, quiet)?;
        }
        Commands::Status { repo, check_stale } => {
            status::run(repo, check_stale, quiet)?;
        }
        Commands::Hook { action } => match action {
            HookAction::Install { repo, kind } => hook::install(repo, &kind, quiet)?,
            HookAction::Uninstall { repo, kind } => hook::uninstall(repo, &kind, quiet)?,
            HookAction::Status { repo } => hook::status(repo)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { repo } => config_cmd::show(&repo)?,
            ConfigAction::Path { repo } => config_cmd::path(&repo)?,
        },
        Commands::Clean {
            repo,
            cache,
            docs,
            all,
        } => {
            clean::run(repo, cache, docs, all, quiet)?;
        }
    }

    Ok(())
}
