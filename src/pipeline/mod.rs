//! Analysis-and-Generation Pipeline
//!
//! Ties the stages together: repository scan (optionally restricted to a
//! version-control change set) → per-file generation through the cache and
//! rate limiter → full tree reassembly and write-out.
//!
//! Per-file and per-unit failures are isolated and never abort the pass;
//! only fatal auth errors and an inaccessible repository root do. The run
//! summary reports analyzed/skipped/failed/fallback counts so operators can
//! tell fully AI-generated output from template fallback output.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tracing::{info, warn};

use crate::ai::{
    DocGenerator, GenerationCache, RateLimiter, SharedProvider, create_provider, template,
};
use crate::analyzer::{ChangeTracker, ParseFailure, RepositoryScanner, ScanReport};
use crate::config::Config;
use crate::organizer::DocumentationOrganizer;
use crate::types::{ModuleInfo, Result};

/// Which reference revision an incremental run diffs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesSince {
    /// `HEAD~1..HEAD`
    LastCommit,
    /// A given revision vs HEAD
    Revision(String),
    /// Worktree vs HEAD
    Uncommitted,
}

/// Per-run options layered over the configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Restrict generation to files changed since a reference revision.
    /// Tree assembly still covers the whole repository.
    pub changes_since: Option<ChangesSince>,
    /// Explicit changed-path set (overrides `changes_since`; used by hooks)
    pub changed_paths: Option<Vec<String>>,
    /// Entry-point/public-surface heuristics only
    pub priority_only: bool,
    /// Per-run override of the configured `max_files` ceiling
    pub max_files: Option<usize>,
    /// Skip the project overview synthesis
    pub skip_overview: bool,
}

/// What one pipeline run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub analyzed: usize,
    pub parse_errors: Vec<ParseFailure>,
    pub skipped_too_large: usize,
    pub skipped_ignored: usize,
    pub truncated: bool,
    pub generated_units: usize,
    pub fallback_units: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub files_written: usize,
    pub duration: Duration,
}

impl RunSummary {
    pub fn total_units(&self) -> usize {
        self.generated_units + self.fallback_units
    }
}

pub struct Pipeline {
    repo_root: PathBuf,
    config: Config,
    cache: Arc<GenerationCache>,
    limiter: Arc<RateLimiter>,
    provider: Option<SharedProvider>,
}

impl Pipeline {
    /// Build a pipeline from configuration, constructing the provider
    pub fn from_config<P: AsRef<Path>>(repo_root: P, config: Config) -> Result<Self> {
        let provider = create_provider(&config.generation)?;
        Ok(Self::with_provider(repo_root, config, provider))
    }

    /// Build a pipeline with an explicit provider (or none)
    pub fn with_provider<P: AsRef<Path>>(
        repo_root: P,
        config: Config,
        provider: Option<SharedProvider>,
    ) -> Self {
        let repo_root = repo_root.as_ref().to_path_buf();
        let mut cache_config = config.cache.clone();
        if cache_config.dir.is_relative() {
            cache_config.dir = repo_root.join(&cache_config.dir);
        }

        let cache = Arc::new(GenerationCache::new(&cache_config));
        let limiter = Arc::new(RateLimiter::from_config(&config.generation.rate));

        Self {
            repo_root,
            config,
            cache,
            limiter,
            provider,
        }
    }

    /// Run the full pipeline: scan, generate, organize, write
    pub async fn run(&self, options: &PipelineOptions) -> Result<RunSummary> {
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        match &self.provider {
            Some(p) => info!(
                "Starting documentation run {} (provider {}, model {})",
                run_id,
                p.name(),
                p.model()
            ),
            None => info!("Starting documentation run {} (template fallback only)", run_id),
        }

        // ---------------------------------------------------------------------
        // Scan: the whole repository, chunked, in parallel
        // ---------------------------------------------------------------------
        let scanner = RepositoryScanner::with_config(&self.repo_root, &self.config.analysis)
            .priority_only(options.priority_only)
            .with_max_files(options.max_files.or(self.config.analysis.max_files));

        let report = scanner.scan_chunked().await?;
        if report.truncated {
            warn!("Scan truncated by max_files ceiling; output is partial");
        }

        // ---------------------------------------------------------------------
        // Candidate restriction: diff layer is an optimization only; content
        // identity at the cache layer stays the final authority
        // ---------------------------------------------------------------------
        let changed: Option<HashSet<String>> = match (&options.changed_paths, &options.changes_since)
        {
            (Some(paths), _) => Some(paths.iter().cloned().collect()),
            (None, Some(since)) => Some(self.resolve_change_set(since)?),
            (None, None) => None,
        };

        let generate_for: Vec<&ModuleInfo> = match &changed {
            Some(set) => report
                .modules
                .iter()
                .filter(|m| set.contains(&m.path))
                .collect(),
            None => report.modules.iter().collect(),
        };

        info!(
            "Scanned {} modules ({} parse errors), generating documentation for {}",
            report.modules.len(),
            report.parse_errors.len(),
            generate_for.len()
        );

        // ---------------------------------------------------------------------
        // Generate: bounded worker pool over candidate files
        // ---------------------------------------------------------------------
        let generator = Arc::new(DocGenerator::new(
            self.provider.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.limiter),
            self.config.generation.clone(),
        ));

        let mut contents: HashMap<String, String> = HashMap::new();
        let mut generated_units = 0usize;
        let mut fallback_units = 0usize;

        let mut stream = futures::stream::iter(generate_for.iter().map(|module| {
            let generator = Arc::clone(&generator);
            async move {
                let docs = generator.generate_file(module).await;
                (module.path.clone(), docs)
            }
        }))
        .buffer_unordered(self.config.analysis.workers.max(1));

        while let Some((path, result)) = stream.next().await {
            match result {
                Ok(docs) => {
                    for source in &docs.unit_sources {
                        if source.is_fallback() {
                            fallback_units += 1;
                        } else {
                            generated_units += 1;
                        }
                    }
                    contents.insert(path, docs.doc.text);
                }
                Err(e) if e.is_fatal() => {
                    // Bad credentials abort the run with a clear diagnostic
                    drop(stream);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Generation failed for {}: {}", path, e);
                }
            }
        }

        // ---------------------------------------------------------------------
        // Overview synthesis over all file summaries
        // ---------------------------------------------------------------------
        let overview = if options.skip_overview {
            None
        } else {
            let file_summaries: Vec<(String, String)> = report
                .modules
                .iter()
                .map(|m| {
                    let summary = contents
                        .get(&m.path)
                        .cloned()
                        .unwrap_or_else(|| template::file_fallback(m));
                    (m.path.clone(), summary)
                })
                .collect();

            let project_name = self.project_name();
            let doc = generator
                .generate_overview(&report.modules, &file_summaries, &project_name)
                .await?;
            if doc.source.is_fallback() {
                fallback_units += 1;
            } else {
                generated_units += 1;
            }
            Some(doc.text)
        };

        // ---------------------------------------------------------------------
        // Organize: tree rebuilt from scratch, only changed leaves rewritten
        // ---------------------------------------------------------------------
        let mut output_dir = self.config.output.dir.clone();
        if output_dir.is_relative() {
            output_dir = self.repo_root.join(output_dir);
        }
        let organizer = DocumentationOrganizer::new(&output_dir, &self.config.output.extension);
        let tree = organizer.organize(&report.modules);
        let files_written = organizer.write(&tree, &contents, overview.as_deref())?;

        self.cache.sweep();
        self.cache.flush()?;
        let cache_stats = self.cache.stats();

        let summary = RunSummary {
            run_id,
            analyzed: report.modules.len(),
            parse_errors: report.parse_errors,
            skipped_too_large: report.skipped_too_large,
            skipped_ignored: report.skipped_ignored,
            truncated: report.truncated,
            generated_units,
            fallback_units,
            cache_hits: cache_stats.hits,
            cache_misses: cache_stats.misses,
            files_written,
            duration: started.elapsed(),
        };

        info!(
            "Run complete: {} analyzed, {} units generated, {} fallback, {} files written in {:?}",
            summary.analyzed,
            summary.generated_units,
            summary.fallback_units,
            summary.files_written,
            summary.duration
        );

        Ok(summary)
    }

    /// Probe the configured provider. `None` when generation is disabled and
    /// every unit will use the template fallback.
    pub async fn provider_health(&self) -> Option<bool> {
        match &self.provider {
            Some(p) => Some(p.health_check().await.unwrap_or(false)),
            None => None,
        }
    }

    /// Access the scan stage alone (used by `analyze --dry-run` and status)
    pub async fn scan_only(&self, options: &PipelineOptions) -> Result<ScanReport> {
        let scanner = RepositoryScanner::with_config(&self.repo_root, &self.config.analysis)
            .priority_only(options.priority_only)
            .with_max_files(options.max_files.or(self.config.analysis.max_files));
        scanner.scan_chunked().await
    }

    fn resolve_change_set(&self, since: &ChangesSince) -> Result<HashSet<String>> {
        let tracker = ChangeTracker::new(&self.repo_root);
        let changes = match since {
            ChangesSince::LastCommit => tracker.last_commit()?,
            ChangesSince::Revision(rev) => tracker.diff(rev, "HEAD")?,
            ChangesSince::Uncommitted => tracker.uncommitted()?,
        };
        Ok(changes.candidates().into_iter().collect())
    }

    fn project_name(&self) -> String {
        self.config
            .project
            .name
            .clone()
            .or_else(|| {
                self.repo_root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "project".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{CompletionProvider, CompletionRequest};
    use async_trait::async_trait;
    use sha2::{Digest, Sha256};
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    /// Deterministic provider: output is a hash of the prompt
    struct EchoProvider {
        calls: AtomicU32,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let digest = Sha256::digest(request.prompt.as_bytes());
            Ok(format!("Generated documentation [{:x}]", digest))
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.cache.dir = root.join(".autodocs-test/cache");
        config.output.dir = root.join("docs");
        config.analysis.workers = 2;
        config
    }

    fn snapshot_output(dir: &Path) -> Vec<(String, String)> {
        let mut files = Vec::new();
        let walker = ignore::WalkBuilder::new(dir).build();
        for entry in walker.filter_map(|e| e.ok()) {
            if entry.path().is_file() {
                files.push((
                    entry.path().to_string_lossy().to_string(),
                    fs::read_to_string(entry.path()).unwrap(),
                ));
            }
        }
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_full_run_writes_docs() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "src/app.py",
            "\"\"\"App module.\"\"\"\n\ndef run():\n    pass\n",
        );

        let provider = Arc::new(EchoProvider::new());
        let pipeline =
            Pipeline::with_provider(temp.path(), test_config(temp.path()), Some(provider));

        let summary = pipeline.run(&PipelineOptions::default()).await.unwrap();
        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.fallback_units, 0);
        assert!(summary.generated_units >= 2);
        assert!(temp.path().join("docs/src/app.md").exists());
        assert!(temp.path().join("docs/README.md").exists());
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent_with_full_cache_hits() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.py", "def f():\n    pass\n");
        write(temp.path(), "src/b.py", "def g():\n    pass\n");

        let provider = Arc::new(EchoProvider::new());
        let config = test_config(temp.path());

        let pipeline =
            Pipeline::with_provider(temp.path(), config.clone(), Some(Arc::clone(&provider) as SharedProvider));
        pipeline.run(&PipelineOptions::default()).await.unwrap();
        let first_calls = provider.call_count();
        let first_output = snapshot_output(&temp.path().join("docs"));

        // Fresh pipeline instance reloads the persisted cache
        let pipeline2 =
            Pipeline::with_provider(temp.path(), config, Some(Arc::clone(&provider) as SharedProvider));
        let summary2 = pipeline2.run(&PipelineOptions::default()).await.unwrap();

        // No new provider calls, byte-identical output, nothing rewritten
        assert_eq!(provider.call_count(), first_calls);
        assert_eq!(snapshot_output(&temp.path().join("docs")), first_output);
        assert_eq!(summary2.files_written, 0);
        assert_eq!(summary2.cache_misses, 0);
        assert!(summary2.cache_hits > 0);
    }

    #[tokio::test]
    async fn test_incremental_run_touches_only_changed_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/f1.py", "def one():\n    pass\n");
        write(temp.path(), "src/f2.py", "def two():\n    pass\n");
        write(temp.path(), "src/f3.py", "def three():\n    pass\n");

        let provider = Arc::new(EchoProvider::new());
        let config = test_config(temp.path());
        let pipeline =
            Pipeline::with_provider(temp.path(), config, Some(Arc::clone(&provider) as SharedProvider));

        pipeline.run(&PipelineOptions::default()).await.unwrap();

        // Change f1 and f3; leave f2 alone
        write(temp.path(), "src/f1.py", "def one_changed():\n    pass\n");
        write(temp.path(), "src/f3.py", "def three_changed():\n    pass\n");
        let f2_doc_before =
            fs::read_to_string(temp.path().join("docs/src/f2.md")).unwrap();
        let calls_before = provider.call_count();

        let options = PipelineOptions {
            changed_paths: Some(vec!["src/f1.py".to_string(), "src/f3.py".to_string()]),
            skip_overview: true,
            ..Default::default()
        };
        pipeline.run(&options).await.unwrap();

        // f2's output untouched; only the changed files cost provider calls
        assert_eq!(
            fs::read_to_string(temp.path().join("docs/src/f2.md")).unwrap(),
            f2_doc_before
        );
        // 2 files x (1 function + 1 synthesis) = 4 calls
        assert_eq!(provider.call_count() - calls_before, 4);
    }

    #[tokio::test]
    async fn test_run_without_provider_is_total() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.py", "def f():\n    pass\n");

        let pipeline = Pipeline::with_provider(temp.path(), test_config(temp.path()), None);
        let summary = pipeline.run(&PipelineOptions::default()).await.unwrap();

        assert_eq!(summary.generated_units, 0);
        assert!(summary.fallback_units > 0);
        let doc = fs::read_to_string(temp.path().join("docs/src/a.md")).unwrap();
        assert!(!doc.trim().is_empty());
    }

    #[tokio::test]
    async fn test_parse_errors_do_not_abort_run() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/good.py", "def f():\n    pass\n");
        write(temp.path(), "src/bad.py", "def broken(:\n");

        let pipeline = Pipeline::with_provider(temp.path(), test_config(temp.path()), None);
        let summary = pipeline.run(&PipelineOptions::default()).await.unwrap();

        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.parse_errors.len(), 1);
        assert!(temp.path().join("docs/src/good.md").exists());
    }
}
