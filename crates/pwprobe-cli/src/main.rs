//! pwprobe: conformance harness for password-generator panels
//!
//! ## Usage
//!
//! ```bash
//! pwprobe simulate                          # All scenarios against the simulated panel
//! pwprobe simulate --fault ignore-flag:symbols
//! pwprobe run --scenario checkboxes         # Live page in headless chromium
//! pwprobe run --format junit -o report.xml  # CI report
//! pwprobe plan                              # Print the configuration walk
//! ```

use clap::Parser;
use pwprobe_cli::{
    check_fixtures, logging, render_config, render_plan, Cli, CliConfig, CliError, CliResult,
    ColorChoice, Commands, ScenarioRunner, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    match cli.command {
        Commands::Run(args) => block_on(async {
            ScenarioRunner::new(config).run(&args).await
        }),
        Commands::Simulate(args) => block_on(async {
            ScenarioRunner::new(config).simulate(&args).await
        }),
        Commands::Plan(args) => {
            print!("{}", render_plan(&args)?);
            Ok(())
        }
        Commands::CheckFixtures(args) => {
            println!("{}", check_fixtures(&args)?);
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", render_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(cli.log_format.into())
}

fn block_on<F>(future: F) -> CliResult<()>
where
    F: std::future::Future<Output = CliResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Io)?;
    runtime.block_on(future)
}
