//! Repository Scanner
//!
//! Walks the repository tree, applies ignore-pattern filtering, and feeds
//! candidate files to the structural parsers.
//!
//! ## Modes
//!
//! - **fast**: path collection only, no parsing
//! - **full**: parse every candidate synchronously
//! - **chunked**: parse in fixed-size batches on a bounded worker pool, with
//!   an optional `max_files` ceiling that stops at a batch boundary and flags
//!   the result as truncated
//!
//! Ignore patterns match individual path segments; an excluded directory
//! prunes its whole subtree without descending into it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, warn};

use crate::analyzer::parser::{Language, create_parser_for_path, detect_language};
use crate::config::AnalysisConfig;
use crate::types::{AutoDocError, ModuleInfo, Result};

/// One recorded per-file parse failure; the run continues past it
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub path: String,
    pub message: String,
}

/// Result of a scan pass
#[derive(Debug, Default)]
pub struct ScanReport {
    pub modules: Vec<ModuleInfo>,
    pub parse_errors: Vec<ParseFailure>,
    pub skipped_too_large: usize,
    pub skipped_ignored: usize,
    /// Set when a `max_files` ceiling stopped the scan early. Never silently
    /// dropped; callers must surface partial results as partial.
    pub truncated: bool,
    /// Walker entries actually visited (excluded subtrees are never entered)
    pub visited: usize,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.modules.extend(other.modules);
        self.parse_errors.extend(other.parse_errors);
        self.skipped_too_large += other.skipped_too_large;
        self.skipped_ignored += other.skipped_ignored;
        self.truncated |= other.truncated;
        self.visited += other.visited;
    }
}

pub struct RepositoryScanner {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
    languages: Vec<Language>,
    max_file_size: u64,
    chunk_size: usize,
    max_files: Option<usize>,
    workers: usize,
    priority_only: bool,
}

impl RepositoryScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_config(root, &AnalysisConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(root: P, config: &AnalysisConfig) -> Self {
        let exclude = config
            .exclude_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid exclude pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        let languages = config
            .languages
            .iter()
            .filter_map(|name| name.parse::<Language>().ok())
            .collect();

        Self {
            root: root.as_ref().to_path_buf(),
            exclude,
            languages,
            max_file_size: config.max_file_size,
            chunk_size: config.chunk_size.max(1),
            max_files: config.max_files,
            workers: config.workers.max(1),
            priority_only: false,
        }
    }

    /// Restrict candidates to entry-point/public-surface files
    pub fn priority_only(mut self, enabled: bool) -> Self {
        self.priority_only = enabled;
        self
    }

    pub fn with_max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }

    /// Fast mode: candidate paths (relative to the root), no parsing
    pub fn paths(&self) -> Result<Vec<String>> {
        let (candidates, _report) = self.collect_candidates()?;
        Ok(candidates
            .into_iter()
            .filter_map(|p| self.relative(&p))
            .collect())
    }

    /// Full mode: parse every candidate synchronously
    pub fn scan(&self) -> Result<ScanReport> {
        let (candidates, mut report) = self.collect_candidates()?;

        for (index, path) in candidates.iter().enumerate() {
            if let Some(max) = self.max_files
                && index >= max
            {
                report.truncated = true;
                break;
            }
            self.parse_one(path, &mut report);
        }

        Ok(report)
    }

    /// Chunked mode: parse in fixed-size batches on a bounded worker pool.
    /// Stops at a batch boundary once the `max_files` ceiling is reached.
    pub async fn scan_chunked(&self) -> Result<ScanReport> {
        let (candidates, mut report) = self.collect_candidates()?;
        let mut processed = 0usize;

        for chunk in candidates.chunks(self.chunk_size) {
            if let Some(max) = self.max_files
                && processed >= max
            {
                report.truncated = true;
                break;
            }

            let remaining = self.max_files.map(|max| max - processed);
            let batch: Vec<PathBuf> = match remaining {
                Some(r) if r < chunk.len() => chunk[..r].to_vec(),
                _ => chunk.to_vec(),
            };
            if batch.len() < chunk.len() {
                report.truncated = true;
            }

            let root = self.root.clone();
            let max_file_size = self.max_file_size;

            let mut stream = futures::stream::iter(batch.into_iter())
                .map(move |path| {
                    let root = root.clone();
                    tokio::task::spawn_blocking(move || {
                        let mut partial = ScanReport::default();
                        parse_file(&root, &path, max_file_size, &mut partial);
                        partial
                    })
                })
                .buffer_unordered(self.workers);

            while let Some(joined) = stream.next().await {
                match joined {
                    Ok(partial) => {
                        processed += 1;
                        report.merge(partial);
                    }
                    Err(e) => {
                        warn!("Parse worker panicked: {}", e);
                        processed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    // =========================================================================
    // Candidate collection
    // =========================================================================

    /// Walk the tree once, pruning excluded directories without descending
    fn collect_candidates(&self) -> Result<(Vec<PathBuf>, ScanReport)> {
        if !self.root.exists() {
            return Err(AutoDocError::Config(format!(
                "Repository root does not exist: {}",
                self.root.display()
            )));
        }

        let mut report = ScanReport::default();
        let mut candidates = Vec::new();

        let exclude = self.exclude.clone();
        let ignored_counter = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ignored_counter);

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                let excluded = entry
                    .file_name()
                    .to_str()
                    .map(|name| exclude.iter().any(|p| p.matches(name)))
                    .unwrap_or(false);
                if excluded {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                !excluded
            })
            .build();

        let priority = self.priority_only.then(priority_pattern);

        for entry in walker.filter_map(|e| e.ok()) {
            report.visited += 1;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(language) = detect_language(path) else {
                continue;
            };
            if !self.languages.is_empty() && !self.languages.contains(&language) {
                continue;
            }

            if let Some(pattern) = &priority {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !pattern.is_match(name) {
                    continue;
                }
            }

            candidates.push(path.to_path_buf());
        }

        // Stable order keeps chunk composition deterministic between runs
        candidates.sort();

        report.skipped_ignored = ignored_counter.load(Ordering::Relaxed);
        debug!(
            "Collected {} candidates ({} entries visited, {} ignored)",
            candidates.len(),
            report.visited,
            report.skipped_ignored
        );

        Ok((candidates, report))
    }

    fn parse_one(&self, path: &Path, report: &mut ScanReport) {
        parse_file(&self.root, path, self.max_file_size, report);
    }

    fn relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
    }
}

/// Parse a single candidate into the report. Size ceiling is enforced here,
/// before any content is read.
fn parse_file(root: &Path, path: &Path, max_file_size: u64, report: &mut ScanReport) {
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    match path.metadata() {
        Ok(meta) if meta.len() > max_file_size => {
            debug!("Skipping {} (too large: {} bytes)", relative, meta.len());
            report.skipped_too_large += 1;
            return;
        }
        Ok(_) => {}
        Err(e) => {
            report.parse_errors.push(ParseFailure {
                path: relative,
                message: format!("Cannot stat file: {}", e),
            });
            return;
        }
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.parse_errors.push(ParseFailure {
                path: relative,
                message: format!("Cannot read file: {}", e),
            });
            return;
        }
    };

    let Some(parser) = create_parser_for_path(&relative) else {
        return;
    };

    match parser.parse(&relative, &content) {
        Ok(module) => report.modules.push(module),
        Err(e) => {
            debug!("Parse failure in {}: {}", relative, e);
            report.parse_errors.push(ParseFailure {
                path: relative,
                message: e.to_string(),
            });
        }
    }
}

/// Entry-point and public-surface file names, for fast iterative runs
fn priority_pattern() -> Regex {
    Regex::new(r"^(main|index|app|lib|mod|__init__|server|api|cli|setup)\.[A-Za-z]+$")
        .expect("static regex")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner(root: &Path) -> RepositoryScanner {
        RepositoryScanner::with_config(root, &AnalysisConfig::default())
    }

    #[test]
    fn test_full_scan_collects_modules() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.py", "def f():\n    pass\n");
        write(temp.path(), "src/b.py", "def g():\n    pass\n");
        write(temp.path(), "README.md", "# not source\n");

        let report = scanner(temp.path()).scan().unwrap();
        assert_eq!(report.modules.len(), 2);
        assert!(report.parse_errors.is_empty());
        assert!(!report.truncated);
    }

    #[test]
    fn test_ignore_pattern_prunes_subtree() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.py", "def f():\n    pass\n");
        write(
            temp.path(),
            "node_modules/sub/deep/file.py",
            "def hidden():\n    pass\n",
        );

        let report = scanner(temp.path()).scan().unwrap();
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].path, "src/a.py");
        assert!(report.skipped_ignored >= 1);

        // The pruned subtree is never visited: the walker saw only the root,
        // src/, the one source file, and the README-free remainder.
        let visited_paths = report.visited;
        assert!(visited_paths < 6, "visited {} entries", visited_paths);
    }

    #[test]
    fn test_parse_isolation() {
        let temp = TempDir::new().unwrap();
        for i in 0..9 {
            write(
                temp.path(),
                &format!("src/ok{}.py", i),
                "def f():\n    pass\n",
            );
        }
        write(temp.path(), "src/broken.py", "def broken(:\n  pass\n");

        let report = scanner(temp.path()).scan().unwrap();
        assert_eq!(report.modules.len(), 9);
        assert_eq!(report.parse_errors.len(), 1);
        assert!(report.parse_errors[0].path.contains("broken.py"));
    }

    #[test]
    fn test_size_ceiling_skips_without_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/small.py", "def f():\n    pass\n");
        let big = format!("# {}\n", "x".repeat(64));
        write(temp.path(), "src/big.py", &big);

        let mut config = AnalysisConfig::default();
        config.max_file_size = 32;
        let report = RepositoryScanner::with_config(temp.path(), &config)
            .scan()
            .unwrap();

        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.skipped_too_large, 1);
        assert!(report.parse_errors.is_empty());
    }

    #[test]
    fn test_max_files_sets_truncation_flag() {
        let temp = TempDir::new().unwrap();
        for i in 0..5 {
            write(
                temp.path(),
                &format!("src/m{}.py", i),
                "def f():\n    pass\n",
            );
        }

        let report = scanner(temp.path())
            .with_max_files(Some(2))
            .scan()
            .unwrap();
        assert_eq!(report.modules.len(), 2);
        assert!(report.truncated);
    }

    #[test]
    fn test_fast_mode_returns_relative_paths() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "pkg/x.go", "package pkg\n");
        write(temp.path(), "src/y.rs", "fn f() {}\n");

        let mut paths = scanner(temp.path()).paths().unwrap();
        paths.sort();
        assert_eq!(paths, vec!["pkg/x.go", "src/y.rs"]);
    }

    #[test]
    fn test_priority_only_restricts_candidates() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/main.py", "def entry():\n    pass\n");
        write(temp.path(), "src/helper.py", "def h():\n    pass\n");

        let report = scanner(temp.path()).priority_only(true).scan().unwrap();
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].path, "src/main.py");
    }

    #[tokio::test]
    async fn test_chunked_scan_matches_full_scan() {
        let temp = TempDir::new().unwrap();
        for i in 0..7 {
            write(
                temp.path(),
                &format!("src/m{}.py", i),
                &format!("def f{}():\n    pass\n", i),
            );
        }

        let mut config = AnalysisConfig::default();
        config.chunk_size = 3;
        config.workers = 2;
        let scanner = RepositoryScanner::with_config(temp.path(), &config);

        let report = scanner.scan_chunked().await.unwrap();
        assert_eq!(report.modules.len(), 7);
        assert!(!report.truncated);
    }

    #[tokio::test]
    async fn test_chunked_scan_truncates_at_batch_boundary() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            write(
                temp.path(),
                &format!("src/m{}.py", i),
                "def f():\n    pass\n",
            );
        }

        let mut config = AnalysisConfig::default();
        config.chunk_size = 4;
        config.max_files = Some(6);
        let scanner = RepositoryScanner::with_config(temp.path(), &config);

        let report = scanner.scan_chunked().await.unwrap();
        assert_eq!(report.modules.len(), 6);
        assert!(report.truncated);
    }
}
