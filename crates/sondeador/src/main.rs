//! Sondeador: command-line runner for the Sondeo regression scenarios
//!
//! ## Usage
//!
//! ```bash
//! sondeador run                            # All scenarios in Chromium
//! sondeador run --backend mock             # Against the fake search engine
//! sondeador run --filter TC_GS_014 --headed
//! sondeador list                           # Catalogued scenarios
//! sondeador config --config sondeo.yaml    # Effective configuration
//! ```

use clap::Parser;
use sondeador::{
    init_logging, resolve_config, Cli, CliConfig, CliResult, ColorChoice, Commands, ConfigArgs,
    ListArgs, SuiteRunner, Verbosity,
};
use sondeo::scenario::{catalog, ScenarioRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => SuiteRunner::new(&config, args.format.into())
            .run(&args)
            .map(|_| ()),
        Commands::List(args) => {
            run_list(&args);
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}

fn run_list(args: &ListArgs) {
    let scenarios = catalog();
    let mut runner = ScenarioRunner::new();
    if let Some(ref filter) = args.filter {
        runner = runner.with_filter(filter.clone());
    }
    for scenario in runner.select(&scenarios) {
        println!("{}  {}", scenario.id, scenario.title);
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(&args.source)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
