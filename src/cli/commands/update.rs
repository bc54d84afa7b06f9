//! Update Command
//!
//! Incremental run: regenerate documentation only for files reported
//! changed by version control. The cache still deduplicates against
//! content-identical units, so a touched-but-unchanged file costs a cache
//! hit rather than a generation call.

use std::path::PathBuf;

use crate::analyzer::ChangeTracker;
use crate::cli::commands::analyze::load_for_repo;
use crate::cli::output::Output;
use crate::pipeline::{ChangesSince, Pipeline, PipelineOptions};
use crate::types::Result;

#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub repo: PathBuf,
    /// Diff against this revision instead of the last commit
    pub since: Option<String>,
    /// Diff the worktree against HEAD instead of the last commit
    pub uncommitted: bool,
    /// Regenerate everything, ignoring the change set
    pub force: bool,
    pub quiet: bool,
}

pub async fn run(args: UpdateArgs) -> Result<()> {
    let output = Output::new(args.quiet);
    let config = load_for_repo(&args.repo)?;

    let changes_since = if args.force {
        None
    } else if !ChangeTracker::new(&args.repo).is_git_repo() {
        output.warning("Not a git repository; regenerating everything");
        None
    } else if args.uncommitted {
        Some(ChangesSince::Uncommitted)
    } else {
        match &args.since {
            Some(rev) => Some(ChangesSince::Revision(rev.clone())),
            None => Some(ChangesSince::LastCommit),
        }
    };

    let pipeline = Pipeline::from_config(&args.repo, config)?;
    let options = PipelineOptions {
        changes_since,
        ..Default::default()
    };

    let summary = pipeline.run(&options).await?;
    output.summary(&summary);
    output.success("Documentation updated");

    Ok(())
}
