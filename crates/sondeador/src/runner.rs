//! Scenario run orchestration

use crate::commands::{BackendArg, ConfigSource, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_json, OutputFormat, ProgressReporter};
use sondeo::mock::{fast_config, MockSession};
use sondeo::scenario::{catalog, ScenarioRunner, SuiteResults};
use sondeo::{SearchLabels, Session, SondeoConfig, SondeoResult};
use std::time::Duration;
use tracing::info;

/// Build the effective library configuration.
///
/// Layers, lowest first: defaults (fast timeouts for the mock backend), the
/// YAML file, `SONDEO_BASE_URL`/`CHROMIUM_PATH`, then command-line flags.
pub fn resolve_config(source: &ConfigSource) -> CliResult<SondeoConfig> {
    let mut config = match source.config {
        Some(ref path) => SondeoConfig::load(path)?,
        None if source.backend == BackendArg::Mock => fast_config(),
        None => SondeoConfig::default(),
    }
    .with_env_overrides();

    if let Some(ref url) = source.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(locale) = source.locale {
        config = config.with_labels(SearchLabels::for_locale(locale.code())?);
    }
    if source.headed {
        config.browser.headless = false;
    }

    config.validate()?;
    Ok(config)
}

/// Open a fresh session on `backend`
pub fn open_session(backend: BackendArg, config: &SondeoConfig) -> SondeoResult<Box<dyn Session>> {
    match backend {
        BackendArg::Mock => Ok(Box::new(MockSession::fake(config))),
        #[cfg(feature = "browser")]
        BackendArg::Chromium => Ok(Box::new(sondeo::browser::ChromiumSession::launch(
            &config.browser,
        )?)),
        #[cfg(not(feature = "browser"))]
        BackendArg::Chromium => Err(sondeo::SondeoError::BrowserLaunch {
            message: "built without the browser feature".to_string(),
        }),
    }
}

/// Runs the scenario catalog and reports results
#[derive(Debug)]
pub struct SuiteRunner {
    reporter: ProgressReporter,
    format: OutputFormat,
}

impl SuiteRunner {
    /// Create a new suite runner
    #[must_use]
    pub fn new(config: &CliConfig, format: OutputFormat) -> Self {
        // JSON owns stdout; keep stderr to failures only
        let quiet = config.verbosity.is_quiet() || format == OutputFormat::Json;
        let reporter = ProgressReporter::new(config.color.should_color(), quiet);
        Self { reporter, format }
    }

    /// Run the selected scenarios.
    ///
    /// Returns the suite results; a suite with failures is an error after
    /// the results have been reported.
    pub fn run(&mut self, args: &RunArgs) -> CliResult<SuiteResults> {
        let config = resolve_config(&args.source)?;
        let scenarios = catalog();

        let mut runner = ScenarioRunner::new();
        if args.fail_fast {
            runner = runner.with_fail_fast();
        }
        if let Some(ref filter) = args.filter {
            runner = runner.with_filter(filter.clone());
        }

        let selected = runner.select(&scenarios).len();
        if selected == 0 {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches {:?}",
                args.filter.as_deref().unwrap_or_default()
            )));
        }

        info!(
            backend = ?args.source.backend,
            base_url = %config.base_url,
            scenarios = selected,
            "starting suite"
        );

        self.reporter.header(&format!("search suite against {}", config.base_url));
        self.reporter.start_progress(selected as u64, "Running scenarios");
        let backend = args.source.backend;
        let suite = runner.run_with(
            &scenarios,
            &config,
            || open_session(backend, &config),
            |result| {
                self.reporter.scenario(result);
                self.reporter.increment(1);
            },
        );
        self.reporter.finish();

        match self.format {
            OutputFormat::Text => self.reporter.summary(
                suite.passed_count(),
                suite.failed_count(),
                Duration::from_millis(suite.duration_ms),
            ),
            OutputFormat::Json => println!("{}", render_json(&suite)?),
        }

        if suite.all_passed() {
            Ok(suite)
        } else {
            Err(CliError::scenario_failure(format!(
                "{} of {} scenarios failed",
                suite.failed_count(),
                suite.total()
            )))
        }
    }
}
