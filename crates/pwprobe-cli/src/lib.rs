//! pwprobe CLI library
//!
//! Argument parsing, configuration, progress output and command execution
//! for the `pwprobe` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, FixtureArgs, LogFormatArg, PlanArgs, ReportFormatArg,
    RunArgs, SimulateArgs, SuiteArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_result_line, ProgressReporter};
pub use runner::{
    apply_suite_args, check_fixtures, emit_report, load_fixtures, load_harness_config,
    parse_faults, parse_scenarios, render_config, render_plan, ScenarioRunner,
};
