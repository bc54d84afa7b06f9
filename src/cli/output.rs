use console::style;

use crate::pipeline::RunSummary;

pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// Render the run summary so operators can tell AI-generated output
    /// from template fallback output at a glance.
    pub fn summary(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }

        self.section("Run summary");
        println!("  Files analyzed:    {}", summary.analyzed);
        println!("  Units generated:   {}", summary.generated_units);
        println!("  Template fallback: {}", summary.fallback_units);
        println!(
            "  Cache:             {} hits / {} misses",
            summary.cache_hits, summary.cache_misses
        );
        println!("  Files written:     {}", summary.files_written);
        println!(
            "  Skipped:           {} ignored, {} too large",
            summary.skipped_ignored, summary.skipped_too_large
        );
        println!("  Duration:          {:.1?}", summary.duration);

        if summary.truncated {
            self.warning("Scan hit the max-files ceiling; output is partial");
        }

        if !summary.parse_errors.is_empty() {
            self.warning(&format!(
                "{} file(s) failed to parse:",
                summary.parse_errors.len()
            ));
            for failure in summary.parse_errors.iter().take(10) {
                println!("    {}: {}", failure.path, failure.message);
            }
            if summary.parse_errors.len() > 10 {
                println!("    ... and {} more", summary.parse_errors.len() - 10);
            }
        }
    }
}
