//! Progress and status lines on stderr
//!
//! Reports go to stdout (or `--output`); everything here is for the person
//! watching the run.

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pwprobe::{Scenario, ScenarioResult, SuiteResults};

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Show the scenario currently running
    pub fn scenario_started(&self, scenario: Scenario) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(format!("{}: {}", scenario.name(), scenario.description()));
        }
    }

    /// Record a finished scenario
    pub fn scenario_finished(&self, result: &ScenarioResult) {
        let line = format_result_line(result, self.use_color);
        self.line(&line, !result.passed);
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        self.line(&format!("{prefix} {message}"), true);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{prefix} {message}"), false);
    }

    /// Print the closing verdict
    pub fn summary(&self, results: &SuiteResults) {
        let failed = results.failed_count();
        if self.quiet && failed == 0 {
            return;
        }
        let verdict = if failed > 0 { "FAILED" } else { "PASSED" };
        let verdict = if self.use_color {
            let style = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            style.apply_to(verdict).to_string()
        } else {
            verdict.to_string()
        };
        self.line(
            &format!(
                "{verdict} {} scenario(s) in {:.2}s ({} passed, {failed} failed) on {}",
                results.total(),
                results.duration.as_secs_f64(),
                results.passed_count(),
                results.target
            ),
            failed > 0,
        );
    }

    fn line(&self, text: &str, always: bool) {
        if self.quiet && !always {
            return;
        }
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = self.term.write_line(text);
            }),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }
}

/// One line per scenario: mark, name, duration, and the failure if any
#[must_use]
pub fn format_result_line(result: &ScenarioResult, use_color: bool) -> String {
    let mark = match (result.passed, use_color) {
        (true, true) => style("✓").green().bold().to_string(),
        (false, true) => style("✗").red().bold().to_string(),
        (true, false) => "PASS".to_string(),
        (false, false) => "FAIL".to_string(),
    };
    let mut line = format!(
        "{mark} {} ({:.2}s)",
        result.scenario,
        result.duration.as_secs_f64()
    );
    if let Some(failure) = &result.failure {
        line.push_str(&format!(": [{}] {}", failure.kind, failure.message));
    }
    line
}
