//! Scenario runner.
//!
//! Each scenario gets a fresh page from a [`SessionFactory`], is
//! bootstrapped into its own [`Session`], and either passes or records one
//! classified failure. A failing scenario never stops the others unless
//! fail-fast is set.

use crate::browser::Browser;
use crate::config::HarnessConfig;
use crate::distribution::{ClassDistributionCheck, DistributionReport};
use crate::driver::PageDriver;
use crate::fixture::FixtureSet;
use crate::flag::FlagSet;
use crate::length::{LengthBoundaryTester, LengthOutcome};
use crate::locator::{names, LocatorRegistry};
use crate::regeneration::{RegenerationChecker, RegenerationOutcome};
use crate::result::{FailureKind, ProbeError, ProbeResult};
use crate::session::Session;
use crate::simulated::{Fault, SimulatedPanel};
use crate::walker::{ConfigurationWalker, WalkPlan, WalkReport};
use crate::widget::StyleProbe;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// A named end-to-end check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Generate twice, values differ
    Regeneration,
    /// Length boundary cases
    Length,
    /// Configuration walk over the four toggles
    Checkboxes,
    /// Class coverage at all-enabled
    Distribution,
}

impl Scenario {
    /// Every scenario in run order
    pub const ALL: [Self; 4] = [
        Self::Regeneration,
        Self::Length,
        Self::Checkboxes,
        Self::Distribution,
    ];

    /// Short name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regeneration => "regeneration",
            Self::Length => "length",
            Self::Checkboxes => "checkboxes",
            Self::Distribution => "distribution",
        }
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Regeneration => "generate button produces a new value",
            Self::Length => "generated and displayed length follow the length field",
            Self::Checkboxes => "values match the enabled classes across all 15 configurations",
            Self::Distribution => "every class appears when all classes are enabled",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProbeError::ConfigError {
                message: format!(
                    "unknown scenario '{s}' (expected one of: {})",
                    Self::ALL.map(Self::name).join(", ")
                ),
            })
    }
}

/// Source of fresh pages, one per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new blank page
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>>;

    /// Label for reports
    fn label(&self) -> &str;
}

#[async_trait]
impl SessionFactory for Browser {
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        Self::new_page(self).await
    }

    fn label(&self) -> &str {
        "chromium"
    }
}

/// Pages backed by [`SimulatedPanel`]
#[derive(Debug)]
pub struct SimulatedFactory {
    registry: LocatorRegistry,
    probe: StyleProbe,
    faults: Vec<Fault>,
    seed: u64,
    opened: AtomicU64,
}

impl SimulatedFactory {
    /// Panels resolving elements through `registry`
    #[must_use]
    pub fn new(registry: LocatorRegistry) -> Self {
        Self {
            registry,
            probe: StyleProbe::default(),
            faults: Vec::new(),
            seed: 0x5EED,
            opened: AtomicU64::new(0),
        }
    }

    /// Inject faults into every panel
    #[must_use]
    pub fn with_faults(mut self, faults: Vec<Fault>) -> Self {
        self.faults = faults;
        self
    }

    /// Base seed; each page offsets it
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Paint colours
    #[must_use]
    pub fn with_probe(mut self, probe: StyleProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Pages handed out so far
    #[must_use]
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for SimulatedFactory {
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        let panel = SimulatedPanel::new(self.registry.clone())
            .with_seed(self.seed.wrapping_add(n))
            .with_probe(self.probe.clone())
            .with_faults(self.faults.iter().cloned());
        Ok(Box::new(panel))
    }

    fn label(&self) -> &str {
        "simulated"
    }
}

/// What a passing scenario observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioDetail {
    /// Regeneration outcome
    Regeneration(RegenerationOutcome),
    /// Length outcomes in case order
    Length {
        /// One per case
        outcomes: Vec<LengthOutcome>,
    },
    /// Walk report
    Checkboxes(WalkReport),
    /// Distribution sample
    Distribution(DistributionReport),
}

/// Why a scenario failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Classification
    pub kind: FailureKind,
    /// Error text
    pub message: String,
    /// Screenshot taken at the failure, if any
    pub screenshot: Option<PathBuf>,
}

impl Failure {
    /// Failure from an error
    #[must_use]
    pub fn from_error(error: &ProbeError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            screenshot: None,
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario
    pub scenario: Scenario,
    /// Whether it passed
    pub passed: bool,
    /// Failure if it did not
    pub failure: Option<Failure>,
    /// Observations if it did
    pub detail: Option<ScenarioDetail>,
    /// Duration
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub const fn pass(scenario: Scenario, detail: ScenarioDetail) -> Self {
        Self {
            scenario,
            passed: true,
            failure: None,
            detail: Some(detail),
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub const fn fail(scenario: Scenario, failure: Failure) -> Self {
        Self {
            scenario,
            passed: false,
            failure: Some(failure),
            detail: None,
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Where pages came from
    pub target: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Individual results
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Runs scenarios against pages from a factory
#[derive(Debug)]
pub struct SuiteRunner {
    fixtures: FixtureSet,
    config: HarnessConfig,
    plan: WalkPlan,
    scenarios: Vec<Scenario>,
}

impl SuiteRunner {
    /// Runner over every scenario with the standard walk
    #[must_use]
    pub fn new(fixtures: FixtureSet, config: HarnessConfig) -> Self {
        Self {
            fixtures,
            config,
            plan: WalkPlan::standard(),
            scenarios: Scenario::ALL.to_vec(),
        }
    }

    /// Run only these scenarios, in the given order
    #[must_use]
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Scenarios this runner will execute
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Run every selected scenario
    pub async fn run(&self, factory: &dyn SessionFactory) -> SuiteResults {
        self.run_with(factory, |_| {}, |_| {}).await
    }

    /// Run every selected scenario, reporting each start and result as it happens
    pub async fn run_with(
        &self,
        factory: &dyn SessionFactory,
        mut on_start: impl FnMut(Scenario),
        mut on_result: impl FnMut(&ScenarioResult),
    ) -> SuiteResults {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.scenarios.len());

        for scenario in &self.scenarios {
            on_start(*scenario);
            let result = self.run_scenario(*scenario, factory).await;
            on_result(&result);
            let stop = !result.passed && self.config.fail_fast;
            results.push(result);
            if stop {
                tracing::warn!(%scenario, "fail-fast: skipping remaining scenarios");
                break;
            }
        }

        SuiteResults {
            suite_name: "password-generator".to_string(),
            target: factory.label().to_string(),
            started_at,
            results,
            duration: start.elapsed(),
        }
    }

    /// Run one scenario in a fresh session
    pub async fn run_scenario(
        &self,
        scenario: Scenario,
        factory: &dyn SessionFactory,
    ) -> ScenarioResult {
        let span = tracing::info_span!("scenario", name = scenario.name());
        async move {
            let start = Instant::now();
            let result = match self.execute(scenario, factory).await {
                Ok(detail) => {
                    tracing::info!("passed");
                    ScenarioResult::pass(scenario, detail)
                }
                Err(failure) => {
                    tracing::warn!(kind = %failure.kind, message = %failure.message, "failed");
                    ScenarioResult::fail(scenario, failure)
                }
            };
            result.with_duration(start.elapsed())
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        scenario: Scenario,
        factory: &dyn SessionFactory,
    ) -> Result<ScenarioDetail, Failure> {
        let page = factory
            .new_page()
            .await
            .map_err(|e| Failure::from_error(&e))?;
        let mut session = Session::open(page, &self.fixtures, &self.config)
            .await
            .map_err(|e| Failure::from_error(&e))?;

        let outcome = self.check(scenario, &mut session).await;
        let outcome = match outcome {
            Ok(detail) => Ok(detail),
            Err(error) => {
                let mut failure = Failure::from_error(&error);
                failure.screenshot = self.capture(scenario, &session).await;
                Err(failure)
            }
        };

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "closing page failed");
        }
        outcome
    }

    async fn check(&self, scenario: Scenario, session: &mut Session) -> ProbeResult<ScenarioDetail> {
        let wait = session.wait();
        match scenario {
            Scenario::Regeneration => {
                let checker = RegenerationChecker::from_registry(session.registry(), wait)?
                    .with_max_attempts(self.config.regeneration_attempts);
                let outcome = checker.verify_regeneration(session.page_mut()).await?;
                Ok(ScenarioDetail::Regeneration(outcome))
            }
            Scenario::Length => {
                let tester = LengthBoundaryTester::from_registry(session.registry(), wait)?;
                let outcomes = tester
                    .verify_all(session.page_mut(), &self.fixtures.length_cases)
                    .await?;
                Ok(ScenarioDetail::Length { outcomes })
            }
            Scenario::Checkboxes => {
                let value = session.selector(names::PASSWORD_VALUE)?;
                let (widgets, page) = session.parts_mut();
                let walker =
                    ConfigurationWalker::new(&self.plan, &self.fixtures.oracle, widgets, value, wait);
                Ok(ScenarioDetail::Checkboxes(walker.walk(page).await?))
            }
            Scenario::Distribution => {
                let regeneration = RegenerationChecker::from_registry(session.registry(), wait)?
                    .with_max_attempts(self.config.regeneration_attempts);
                let check =
                    ClassDistributionCheck::new(regeneration, self.config.distribution_samples);
                let report = check.verify(session.page_mut(), FlagSet::ALL).await?;
                Ok(ScenarioDetail::Distribution(report))
            }
        }
    }

    async fn capture(&self, scenario: Scenario, session: &Session) -> Option<PathBuf> {
        let dir = self.config.artifacts_dir.as_ref()?;
        let bytes = match session.page().screenshot().await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "screenshot failed");
                return None;
            }
        };
        let path = dir.join(format!(
            "{}-{}.png",
            scenario.name(),
            Utc::now().format("%Y%m%dT%H%M%S")
        ));
        let written = tokio::fs::create_dir_all(dir)
            .await
            .and(tokio::fs::write(&path, bytes).await);
        match written {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "writing screenshot failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flag::Flag;
    use crate::wait::WaitOptions;

    fn config() -> HarnessConfig {
        HarnessConfig::default()
            .with_wait(WaitOptions::new().with_timeout(50).with_poll_interval(5))
            .with_distribution_samples(6)
    }

    fn runner() -> SuiteRunner {
        SuiteRunner::new(FixtureSet::bundled().unwrap(), config())
    }

    fn factory(faults: Vec<Fault>) -> SimulatedFactory {
        SimulatedFactory::new(FixtureSet::bundled().unwrap().registry).with_faults(faults)
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_parse() {
            assert_eq!("length".parse::<Scenario>().unwrap(), Scenario::Length);
            assert_eq!(" Checkboxes".parse::<Scenario>().unwrap(), Scenario::Checkboxes);
            let err = "speed".parse::<Scenario>().unwrap_err();
            assert!(err.to_string().contains("regeneration, length, checkboxes, distribution"));
        }

        #[test]
        fn test_serde_name() {
            assert_eq!(serde_json::to_string(&Scenario::Distribution).unwrap(), "\"distribution\"");
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_conforming_panel_passes_everything() {
            let factory = factory(vec![]);
            let results = runner().run(&factory).await;
            assert!(results.all_passed(), "{:?}", results.failures());
            assert_eq!(results.total(), 4);
            assert_eq!(results.target, "simulated");
            assert_eq!(factory.opened(), 4);
        }

        #[tokio::test]
        async fn test_failures_are_scenario_local() {
            let results = runner()
                .run(&factory(vec![Fault::DropFlag(Flag::Symbols)]))
                .await;
            assert_eq!(results.total(), 4);
            assert_eq!(results.failed_count(), 1);
            let failed = results.failures();
            assert_eq!(failed[0].scenario, Scenario::Distribution);
            let failure = failed[0].failure.as_ref().unwrap();
            assert_eq!(failure.kind, FailureKind::ClassDistribution);
            assert!(failure.screenshot.is_none());
        }

        #[tokio::test]
        async fn test_fail_fast_stops_after_first_failure() {
            let runner = SuiteRunner::new(FixtureSet::bundled().unwrap(), config().with_fail_fast(true));
            let results = runner.run(&factory(vec![Fault::StuckValue])).await;
            assert_eq!(results.total(), 1);
            assert!(!results.all_passed());
        }

        #[tokio::test]
        async fn test_run_with_reports_each_scenario() {
            let mut started = Vec::new();
            let mut finished = Vec::new();
            let results = runner()
                .with_scenarios(vec![Scenario::Length, Scenario::Regeneration])
                .run_with(&factory(vec![]), |s| started.push(s), |r| finished.push(r.passed))
                .await;
            assert_eq!(started, vec![Scenario::Length, Scenario::Regeneration]);
            assert_eq!(finished, vec![true, true]);
            assert_eq!(results.total(), 2);
        }

        #[tokio::test]
        async fn test_scenario_filter() {
            let runner = runner().with_scenarios(vec![Scenario::Checkboxes]);
            let results = runner
                .run(&factory(vec![Fault::IgnoreFlag(Flag::Numbers)]))
                .await;
            assert_eq!(results.total(), 1);
            let failure = results.results[0].failure.as_ref().unwrap();
            assert_eq!(failure.kind, FailureKind::OracleMismatch);
            assert!(failure.kind.is_sut_defect());
        }

        #[tokio::test]
        async fn test_bootstrap_failure_is_timeout() {
            let faults = vec![Fault::Missing(names::USE_PASSWORD_GENERATOR.to_string())];
            let results = runner()
                .with_scenarios(vec![Scenario::Length])
                .run(&factory(faults))
                .await;
            let failure = results.results[0].failure.as_ref().unwrap();
            assert_eq!(failure.kind, FailureKind::Timeout);
        }

        #[tokio::test]
        async fn test_walk_detail_recorded() {
            let results = runner()
                .with_scenarios(vec![Scenario::Checkboxes])
                .run(&factory(vec![]))
                .await;
            match results.results[0].detail.as_ref().unwrap() {
                ScenarioDetail::Checkboxes(report) => {
                    assert_eq!(report.distinct_configurations(), 15);
                }
                other => panic!("unexpected detail {other:?}"),
            }
        }
    }
}
