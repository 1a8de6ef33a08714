//! Rendering suite results as text, JUnit XML or JSON.

use crate::result::{ProbeError, ProbeResult};
use crate::suite::{ScenarioDetail, ScenarioResult, SuiteResults};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human readable lines
    #[default]
    Summary,
    /// JUnit XML for CI
    Junit,
    /// Full results as JSON
    Json,
}

impl ReportFormat {
    /// Conventional file extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Summary => "txt",
            Self::Junit => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summary => "summary",
            Self::Junit => "junit",
            Self::Json => "json",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summary" | "text" => Ok(Self::Summary),
            "junit" | "xml" => Ok(Self::Junit),
            "json" => Ok(Self::Json),
            other => Err(ProbeError::ConfigError {
                message: format!("unknown report format '{other}'"),
            }),
        }
    }
}

/// Renders [`SuiteResults`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Reporter for `format`
    #[must_use]
    pub const fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Selected format
    #[must_use]
    pub const fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render in the selected format
    pub fn render(&self, results: &SuiteResults) -> ProbeResult<String> {
        match self.format {
            ReportFormat::Summary => Ok(render_summary(results)),
            ReportFormat::Junit => Ok(render_junit(results)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        }
    }

    /// Render and write to `path`
    ///
    /// # Errors
    ///
    /// Returns error if file writing fails
    pub fn write(&self, results: &SuiteResults, path: &Path) -> ProbeResult<()> {
        let rendered = self.render(results)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

/// One-line verdict
#[must_use]
pub fn headline(results: &SuiteResults) -> String {
    format!(
        "{} [{}]: {}/{} passed in {:.2}s",
        results.suite_name,
        results.target,
        results.passed_count(),
        results.total(),
        results.duration.as_secs_f64()
    )
}

fn render_summary(results: &SuiteResults) -> String {
    let mut out = String::new();
    for result in &results.results {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        let _ = write!(
            out,
            "{mark} {:<13} {:>7.3}s",
            result.scenario.name(),
            result.duration.as_secs_f64()
        );
        match (&result.failure, &result.detail) {
            (Some(failure), _) => {
                let _ = write!(out, "  [{}] {}", failure.kind, failure.message);
                if let Some(shot) = &failure.screenshot {
                    let _ = write!(out, " (screenshot: {})", shot.display());
                }
            }
            (None, Some(detail)) => {
                let _ = write!(out, "  {}", describe(detail));
            }
            (None, None) => {}
        }
        out.push('\n');
    }
    out.push_str(&headline(results));
    out.push('\n');
    out
}

fn describe(detail: &ScenarioDetail) -> String {
    match detail {
        ScenarioDetail::Regeneration(outcome) => {
            format!("changed after {} click(s)", outcome.attempts)
        }
        ScenarioDetail::Length { outcomes } => format!("{} case(s)", outcomes.len()),
        ScenarioDetail::Checkboxes(report) => format!(
            "{} visit(s), {} distinct configuration(s)",
            report.visits.len(),
            report.distinct_configurations()
        ),
        ScenarioDetail::Distribution(report) => {
            format!("{} sample(s), observed {}", report.samples.len(), report.observed)
        }
    }
}

fn render_junit(results: &SuiteResults) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    let _ = writeln!(
        xml,
        r#"<testsuite name="{}" tests="{}" failures="{}" errors="{}" time="{:.3}" timestamp="{}">"#,
        escape_xml(&results.suite_name),
        results.total(),
        count(results, true),
        count(results, false),
        results.duration.as_secs_f64(),
        results.started_at.format("%Y-%m-%dT%H:%M:%S")
    );

    for result in &results.results {
        let _ = writeln!(
            xml,
            r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
            escape_xml(&results.suite_name),
            result.scenario.name(),
            result.duration.as_secs_f64()
        );

        if let Some(failure) = &result.failure {
            // SUT defects are failures, everything else is an error
            let element = if failure.kind.is_sut_defect() {
                "failure"
            } else {
                "error"
            };
            let _ = writeln!(
                xml,
                r#"    <{element} type="{}" message="{}">{}</{element}>"#,
                failure.kind,
                escape_xml(&failure.message),
                escape_xml(&failure.message)
            );
        }

        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

fn count(results: &SuiteResults, sut_defects: bool) -> usize {
    results
        .results
        .iter()
        .filter_map(|r: &ScenarioResult| r.failure.as_ref())
        .filter(|f| f.kind.is_sut_defect() == sut_defects)
        .count()
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
