//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sondeador: runs the Sondeo search engine UI regression scenarios
#[derive(Parser, Debug)]
#[command(name = "sondeador")]
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
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit log records as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run regression scenarios
    Run(RunArgs),

    /// List catalogued scenarios
    List(ListArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Where the effective configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Session backend
    #[arg(short, long, default_value = "chromium")]
    pub backend: BackendArg,

    /// YAML configuration file
    #[arg(short, long, env = "SONDEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the search engine address
    #[arg(long)]
    pub base_url: Option<String>,

    /// Interface language of the search engine
    #[arg(long)]
    pub locale: Option<LocaleArg>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: ConfigSource,

    /// Only run scenarios whose id or title contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop after the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Result format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list scenarios whose id or title contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: ConfigSource,
}

/// Session backend
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendArg {
    /// Real Chromium over the DevTools protocol
    #[default]
    Chromium,
    /// In-process fake search engine
    Mock,
}

/// Search engine interface language
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaleArg {
    /// English labels
    En,
    /// Ukrainian labels
    Uk,
}

impl LocaleArg {
    /// Locale code understood by [`sondeo::SearchLabels::for_locale`]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Uk => "uk",
        }
    }
}

/// Result format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// Suite results as JSON on stdout
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["sondeador", "run"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.source.backend, BackendArg::Chromium);
            assert_eq!(args.format, FormatArg::Text);
            assert!(!args.fail_fast);
            assert!(args.filter.is_none());
        }

        #[test]
        fn test_parse_run_options() {
            let cli = Cli::parse_from([
                "sondeador",
                "-vv",
                "run",
                "--backend",
                "mock",
                "--filter",
                "TC_GS_014",
                "--fail-fast",
                "--locale",
                "uk",
                "--base-url",
                "https://search.example",
                "--headed",
                "--format",
                "json",
            ]);
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.source.backend, BackendArg::Mock);
            assert_eq!(args.filter.as_deref(), Some("TC_GS_014"));
            assert!(args.fail_fast);
            assert_eq!(args.source.locale, Some(LocaleArg::Uk));
            assert!(args.source.headed);
            assert_eq!(args.format, FormatArg::Json);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from(["sondeador", "list", "-q", "--log-json"]);
            assert!(cli.quiet);
            assert!(cli.log_json);
            assert!(matches!(cli.command, Commands::List(_)));
        }

        #[test]
        fn test_parse_config_command() {
            let cli = Cli::parse_from(["sondeador", "config", "--config", "sondeo.yaml"]);
            let Commands::Config(args) = cli.command else {
                panic!("expected config");
            };
            assert_eq!(args.source.config, Some(PathBuf::from("sondeo.yaml")));
        }

        #[test]
        fn test_rejects_unknown_backend() {
            assert!(Cli::try_parse_from(["sondeador", "run", "--backend", "firefox"]).is_err());
        }
    }

    mod arg_tests {
        use super::*;
        use crate::config::ColorChoice;
        use crate::output::OutputFormat;

        #[test]
        fn test_locale_codes() {
            assert_eq!(LocaleArg::En.code(), "en");
            assert_eq!(LocaleArg::Uk.code(), "uk");
        }

        #[test]
        fn test_conversions() {
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
        }
    }
}
