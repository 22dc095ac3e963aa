//! Sondeador CLI Library
//!
//! Command-line front end for the Sondeo scenario catalog: runs scenarios
//! against a real Chromium or the in-process fake search engine, lists the
//! catalog and prints the effective configuration.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    BackendArg, Cli, ColorArg, Commands, ConfigArgs, ConfigSource, FormatArg, ListArgs, LocaleArg,
    RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{render_json, OutputFormat, ProgressReporter};
pub use runner::{open_session, resolve_config, SuiteRunner};
