//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pwprobe: conformance harness for password-generator panels
#[derive(Parser, Debug)]
#[command(name = "pwprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the live page in chromium
    Run(RunArgs),

    /// Run scenarios against the in-process simulated panel
    Simulate(SimulateArgs),

    /// Print the configuration walk
    Plan(PlanArgs),

    /// Load and validate a fixture directory
    CheckFixtures(FixtureArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Options shared by `run` and `simulate`
#[derive(Args, Debug, Clone, Default)]
pub struct SuiteArgs {
    /// Fixture directory (bundled fixtures when omitted)
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Harness configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run only these scenarios (repeatable)
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub format: ReportFormatArg,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for failure screenshots
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Override the polling timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Values sampled by the distribution scenario
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,

    /// Regenerate clicks allowed before regeneration counts as stalled
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Suite options
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Launch chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the simulate command
#[derive(Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    /// Suite options
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Inject a fault, e.g. `ignore-flag:symbols`, `stuck-value`, `lag:3` (repeatable)
    #[arg(long = "fault", value_name = "FAULT")]
    pub faults: Vec<String>,

    /// Seed for generated values
    #[arg(long, default_value = "24301")]
    pub seed: u64,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check-fixtures command
#[derive(Args, Debug, Clone, Default)]
pub struct FixtureArgs {
    /// Fixture directory (bundled fixtures when omitted)
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Harness configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// Human readable summary
    #[default]
    Summary,
    /// JUnit XML
    Junit,
    /// JSON
    Json,
}

impl From<ReportFormatArg> for pwprobe::ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Summary => Self::Summary,
            ReportFormatArg::Junit => Self::Junit,
            ReportFormatArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_simulate_with_faults() {
            let cli = Cli::parse_from([
                "pwprobe",
                "simulate",
                "--fault",
                "stuck-value",
                "--fault",
                "lag:2",
                "--seed",
                "7",
                "-s",
                "length",
            ]);
            if let Commands::Simulate(args) = cli.command {
                assert_eq!(args.faults, vec!["stuck-value", "lag:2"]);
                assert_eq!(args.seed, 7);
                assert_eq!(args.suite.scenarios, vec!["length"]);
                assert_eq!(args.suite.format, ReportFormatArg::Summary);
            } else {
                panic!("expected Simulate command");
            }
        }

        #[test]
        fn test_parse_run_options() {
            let cli = Cli::parse_from([
                "pwprobe",
                "run",
                "--headed",
                "--no-sandbox",
                "--format",
                "junit",
                "--output",
                "out.xml",
                "--timeout",
                "8000",
                "--samples",
                "40",
            ]);
            if let Commands::Run(args) = cli.command {
                assert!(args.headed);
                assert!(args.no_sandbox);
                assert_eq!(args.suite.format, ReportFormatArg::Junit);
                assert_eq!(args.suite.output, Some(PathBuf::from("out.xml")));
                assert_eq!(args.suite.timeout, Some(8000));
                assert_eq!(args.suite.samples, Some(40));
                assert_eq!(args.suite.attempts, None);
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from(["pwprobe", "plan", "-vv", "--log-format", "json"]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.log_format, LogFormatArg::Json);
            assert!(matches!(cli.command, Commands::Plan(PlanArgs { json: false })));
        }

        #[test]
        fn test_check_fixtures_dir() {
            let cli = Cli::parse_from(["pwprobe", "check-fixtures", "--fixtures", "fx"]);
            if let Commands::CheckFixtures(args) = cli.command {
                assert_eq!(args.fixtures, Some(PathBuf::from("fx")));
            } else {
                panic!("expected CheckFixtures command");
            }
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["pwprobe"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_report_format() {
            assert_eq!(
                pwprobe::ReportFormat::from(ReportFormatArg::Json),
                pwprobe::ReportFormat::Json
            );
        }

        #[test]
        fn test_color() {
            assert_eq!(
                crate::config::ColorChoice::from(ColorArg::Never),
                crate::config::ColorChoice::Never
            );
        }
    }
}
