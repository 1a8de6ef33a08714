//! Command execution: load fixtures and config, run the suite, emit the report

use crate::commands::{ConfigArgs, FixtureArgs, PlanArgs, RunArgs, SimulateArgs, SuiteArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use pwprobe::{
    Browser, Fault, FixtureSet, HarnessConfig, Reporter, Scenario, SessionFactory,
    SimulatedFactory, SuiteResults, SuiteRunner, WaitOptions, WalkPlan,
};
use std::path::{Path, PathBuf};

/// Load the harness config file, or defaults
pub fn load_harness_config(path: Option<&Path>) -> CliResult<HarnessConfig> {
    match path {
        Some(path) => Ok(HarnessConfig::load(path)?),
        None => Ok(HarnessConfig::default()),
    }
}

/// Apply command-line overrides on top of the file
pub fn apply_suite_args(config: HarnessConfig, args: &SuiteArgs) -> CliResult<HarnessConfig> {
    let mut config = config;
    if let Some(dir) = &args.fixtures {
        config = config.with_fixture_dir(dir);
    }
    if let Some(dir) = &args.artifacts {
        config = config.with_artifacts_dir(dir);
    }
    if let Some(ms) = args.timeout {
        let interval = config.wait.poll_interval_ms.min(ms);
        config = config.with_wait(WaitOptions::new().with_timeout(ms).with_poll_interval(interval));
    }
    if let Some(samples) = args.samples {
        if samples == 0 {
            return Err(CliError::invalid_argument("--samples must be at least 1"));
        }
        config = config.with_distribution_samples(samples);
    }
    if let Some(attempts) = args.attempts {
        if attempts == 0 {
            return Err(CliError::invalid_argument("--attempts must be at least 1"));
        }
        config = config.with_regeneration_attempts(attempts);
    }
    if args.fail_fast {
        config = config.with_fail_fast(true);
    }
    config.validate()?;
    Ok(config)
}

/// Load fixtures from `dir`, or the bundled set
pub fn load_fixtures(dir: Option<&Path>) -> CliResult<FixtureSet> {
    match dir {
        Some(dir) => Ok(FixtureSet::load_dir(dir)?),
        None => Ok(FixtureSet::bundled()?),
    }
}

/// Parse scenario names; empty means all
pub fn parse_scenarios(names: &[String]) -> CliResult<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }
    let mut scenarios = Vec::with_capacity(names.len());
    for name in names {
        let scenario: Scenario = name.parse()?;
        if !scenarios.contains(&scenario) {
            scenarios.push(scenario);
        }
    }
    Ok(scenarios)
}

/// Parse `--fault` values
pub fn parse_faults(values: &[String]) -> CliResult<Vec<Fault>> {
    values
        .iter()
        .map(|value| value.parse::<Fault>().map_err(CliError::from))
        .collect()
}

/// Runs suites and reports progress
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// `pwprobe simulate`
    pub async fn simulate(&mut self, args: &SimulateArgs) -> CliResult<()> {
        let harness = apply_suite_args(load_harness_config(args.suite.config.as_deref())?, &args.suite)?;
        let fixtures = load_fixtures(harness.fixture_dir.as_deref())?;
        self.describe_fixtures(&fixtures);
        let faults = parse_faults(&args.faults)?;
        if !faults.is_empty() {
            let listed: Vec<String> = faults.iter().map(ToString::to_string).collect();
            self.reporter.info(&format!("injecting faults: {}", listed.join(", ")));
        }
        let factory = SimulatedFactory::new(fixtures.registry.clone())
            .with_probe(harness.widget.probe.clone())
            .with_faults(faults)
            .with_seed(args.seed);
        self.execute(fixtures, harness, &args.suite, &factory).await
    }

    /// `pwprobe run`
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<()> {
        let mut harness =
            apply_suite_args(load_harness_config(args.suite.config.as_deref())?, &args.suite)?;
        if args.headed {
            harness.browser = harness.browser.with_headless(false);
        }
        if let Some(path) = &args.chromium {
            harness.browser = harness.browser.with_chromium_path(path.display().to_string());
        }
        if args.no_sandbox {
            harness.browser = harness.browser.with_no_sandbox();
        }
        let fixtures = load_fixtures(harness.fixture_dir.as_deref())?;
        self.describe_fixtures(&fixtures);
        self.reporter.info(&format!("target {}", fixtures.environment.url));

        let browser = Browser::launch(harness.browser.clone()).await?;
        let outcome = self.execute(fixtures, harness, &args.suite, &browser).await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "closing browser failed");
        }
        outcome
    }

    fn describe_fixtures(&self, fixtures: &FixtureSet) {
        if self.config.verbosity.is_verbose() {
            self.reporter.info(&fixtures.describe());
        }
    }

    async fn execute(
        &mut self,
        fixtures: FixtureSet,
        harness: HarnessConfig,
        args: &SuiteArgs,
        factory: &dyn SessionFactory,
    ) -> CliResult<()> {
        let scenarios = parse_scenarios(&args.scenarios)?;
        let suite = SuiteRunner::new(fixtures, harness).with_scenarios(scenarios);

        self.reporter
            .start_progress(suite.scenarios().len() as u64, "scenarios");
        let reporter = &self.reporter;
        let results = suite
            .run_with(
                factory,
                |scenario| reporter.scenario_started(scenario),
                |result| reporter.scenario_finished(result),
            )
            .await;
        self.reporter.finish();
        self.reporter.summary(&results);

        emit_report(&results, args)?;
        if results.all_passed() {
            Ok(())
        } else {
            Err(CliError::ScenariosFailed {
                failed: results.failed_count(),
                total: results.total(),
            })
        }
    }
}

/// Write the report to `--output` or stdout
pub fn emit_report(results: &SuiteResults, args: &SuiteArgs) -> CliResult<()> {
    let reporter = Reporter::new(args.format.into());
    match &args.output {
        Some(path) => {
            let path = report_path(path, &reporter);
            reporter
                .write(results, &path)
                .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))
        }
        None => {
            print!("{}", reporter.render(results)?);
            Ok(())
        }
    }
}

/// `--output` as given, or a default file name inside it when it is a directory
#[must_use]
pub fn report_path(output: &Path, reporter: &Reporter) -> PathBuf {
    if output.is_dir() {
        output.join(format!("pwprobe-report.{}", reporter.format().extension()))
    } else {
        output.to_path_buf()
    }
}

/// `pwprobe plan`
pub fn render_plan(args: &PlanArgs) -> CliResult<String> {
    let plan = WalkPlan::standard();
    if args.json {
        let steps: Vec<_> = plan.steps().collect();
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "start": plan.start(),
            "steps": steps,
            "distinct": plan.vertices().iter().collect::<std::collections::BTreeSet<_>>().len(),
            "revisits": plan.revisits(),
        }))?);
    }

    let mut out = format!("start  {}\n", plan.start());
    for step in plan.steps() {
        out.push_str(&format!(
            "{:>2}  toggle {:<9}  {} -> {}\n",
            step.index,
            step.toggle.label(),
            step.before,
            step.after
        ));
    }
    let revisits: Vec<String> = plan.revisits().iter().map(ToString::to_string).collect();
    out.push_str(&format!(
        "{} vertices, {} distinct, revisited: {}\n",
        plan.vertices().len(),
        plan.vertices().iter().collect::<std::collections::BTreeSet<_>>().len(),
        if revisits.is_empty() {
            "none".to_string()
        } else {
            revisits.join(", ")
        }
    ));
    Ok(out)
}

/// `pwprobe check-fixtures`
pub fn check_fixtures(args: &FixtureArgs) -> CliResult<String> {
    let fixtures = load_fixtures(args.fixtures.as_deref())?;
    Ok(fixtures.describe())
}

/// `pwprobe config`
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    let config = load_harness_config(args.config.as_deref())?;
    config
        .to_yaml()
        .map_err(|e| CliError::config(e.to_string()))
}
