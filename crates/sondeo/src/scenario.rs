//! Regression scenario catalog and runner.
//!
//! Each scenario drives the page objects through one user journey on a fresh
//! session and checks the resulting page state. A failed check is
//! [`SondeoError::AssertionFailed`]; strict lookups that fail propagate as
//! they are.

use crate::config::SondeoConfig;
use crate::page_object::PageObject;
use crate::pages::{ResultsPage, SearchPage};
use crate::result::{SondeoError, SondeoResult};
use crate::session::Session;
use crate::wait::{pause, wait_until};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

/// Scenario body: drives one session, fails on the first broken check
pub type ScenarioFn = fn(&dyn Session, &SondeoConfig) -> SondeoResult<()>;

/// A catalogued regression case
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Case id (e.g. `TC_GS_002`)
    pub id: &'static str,
    /// What the case checks
    pub title: &'static str,
    /// Body
    pub run: ScenarioFn,
}

impl Scenario {
    /// Whether `filter` occurs in the id or title, ignoring case
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.id.to_lowercase().contains(&filter) || self.title.to_lowercase().contains(&filter)
    }
}

/// Every regression case, in id order
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC_GS_001",
            title: "home page loads",
            run: load_home_page,
        },
        Scenario {
            id: "TC_GS_002",
            title: "simple keyword search",
            run: simple_search,
        },
        Scenario {
            id: "TC_GS_003",
            title: "exact phrase search",
            run: exact_phrase_search,
        },
        Scenario {
            id: "TC_GS_004",
            title: "empty query stays on home page",
            run: empty_search,
        },
        Scenario {
            id: "TC_GS_006",
            title: "suggestions while typing",
            run: search_suggestions,
        },
        Scenario {
            id: "TC_GS_007",
            title: "image search",
            run: image_search,
        },
        Scenario {
            id: "TC_GS_010",
            title: "logo returns to home page",
            run: logo_returns_home,
        },
        Scenario {
            id: "TC_GS_013",
            title: "result statistics present",
            run: stats_present,
        },
        Scenario {
            id: "TC_GS_014",
            title: "pagination to next page",
            run: next_page,
        },
        Scenario {
            id: "TC_GS_015",
            title: "very long query echoed",
            run: long_query,
        },
    ]
}

// =============================================================================
// CHECKS
// =============================================================================

fn ensure(condition: bool, message: impl FnOnce() -> String) -> SondeoResult<()> {
    if condition {
        Ok(())
    } else {
        Err(SondeoError::assertion(message()))
    }
}

/// Wait until the address differs from `before`, then settle
fn await_navigation(session: &dyn Session, config: &SondeoConfig, before: &str) -> SondeoResult<()> {
    wait_until(
        || session.current_url().is_ok_and(|url| url != before),
        &config.wait_options(),
    )
    .map_err(|_| SondeoError::assertion(format!("address never left {before}")))?;
    pause(config.timeouts.settle_ms);
    Ok(())
}

/// Open the home page, search for `query` and wait for the results
fn search_for<'s>(
    session: &'s dyn Session,
    config: &SondeoConfig,
    query: &str,
) -> SondeoResult<ResultsPage<'s>> {
    let home = SearchPage::open(session, config)?;
    let before = session.current_url()?;
    home.search(query)?;
    await_navigation(session, config, &before)?;
    Ok(ResultsPage::attach(session, config))
}

// =============================================================================
// SCENARIOS
// =============================================================================

fn load_home_page(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let home = SearchPage::open(session, config)?;
    ensure(home.are_search_elements_visible(), || {
        "search elements are not visible".into()
    })?;
    let title = home.title()?;
    ensure(title.contains(&config.labels.brand), || {
        format!("title {title:?} lacks {:?}", config.labels.brand)
    })
}

fn simple_search(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let query = "Selenium";
    let results = search_for(session, config, query)?;
    let title = results.title()?;
    ensure(title.contains(query), || {
        format!("results title {title:?} lacks {query:?}")
    })?;
    ensure(results.count_results() > 0, || "no results rendered".into())
}

fn exact_phrase_search(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let query = "\"Python automation\"";
    let results = search_for(session, config, query)?;
    let phrase = query.trim_matches('"').to_lowercase();
    let title = results.title()?.to_lowercase();
    ensure(title.contains(&phrase), || {
        format!("results title {title:?} lacks phrase {phrase:?}")
    })
}

fn empty_search(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let home = SearchPage::open(session, config)?;
    let before = session.current_url()?;
    home.search("")?;
    pause(config.timeouts.settle_ms);
    let after = session.current_url()?;
    ensure(after == before || after.contains('#'), || {
        format!("address moved from {before} to {after}")
    })?;
    let value = home.get_search_input_value()?;
    ensure(value.is_empty(), || format!("input holds {value:?}"))
}

fn search_suggestions(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let part = "seleni";
    let home = SearchPage::open(session, config)?;
    home.enter_search_query(part)?;
    pause(config.timeouts.settle_ms);
    ensure(
        home.are_suggestions_visible(config.wait_options().probe_timeout()),
        || "suggestions did not appear".into(),
    )?;
    let suggestions = home.suggestions();
    let first = suggestions
        .first()
        .map(|s| s.to_lowercase())
        .ok_or_else(|| SondeoError::assertion("no suggestions"))?;
    ensure(first.contains(part), || {
        format!("first suggestion {first:?} lacks {part:?}")
    })
}

fn image_search(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let results = search_for(session, config, "кошенята")?;
    let before = session.current_url()?;
    results.click_images_tab()?;
    await_navigation(session, config, &before)?;
    let images = ResultsPage::attach(session, config);
    ensure(images.is_images_tab_active(), || {
        "images tab is not active".into()
    })?;
    ensure(
        images.are_image_results_visible(config.wait_options().probe_timeout()),
        || "no image thumbnails".into(),
    )
}

fn logo_returns_home(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let query = "тест";
    let results = search_for(session, config, query)?;
    let before = session.current_url()?;
    results.click_logo()?;
    await_navigation(session, config, &before)?;
    let home = SearchPage::attach(session, config);
    ensure(home.are_search_elements_visible(), || {
        "did not return to the home page".into()
    })?;
    let url = session.current_url()?;
    ensure(home.matches_current_url() && !url.to_lowercase().contains(query), || {
        format!("address {url} still carries the query")
    })
}

fn stats_present(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let results = search_for(session, config, "Python")?;
    let stats = results.result_stats_text().to_lowercase();
    let keyword = config.labels.stats_keyword.to_lowercase();
    ensure(stats.contains(&keyword), || {
        format!("statistics {stats:?} lack {keyword:?}")
    })
}

fn next_page(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let results = search_for(session, config, "автоматизація тестування")?;
    ensure(results.count_results() > 0, || {
        "no results on the first page".into()
    })?;
    let first_page = session.current_url()?;
    ensure(results.click_next_page()?, || {
        "next-page control missing".into()
    })?;
    await_navigation(session, config, &first_page)?;
    let second_page = session.current_url()?;
    ensure(second_page != first_page, || "address did not change".into())?;
    ensure(
        ResultsPage::attach(session, config).count_results() > 0,
        || "no results on the second page".into(),
    )
}

fn long_query(session: &dyn Session, config: &SondeoConfig) -> SondeoResult<()> {
    let query = "a".repeat(250);
    let results = search_for(session, config, &query)?;
    let echoed = results.echoed_query_value()?;
    ensure(echoed == query, || {
        format!("echoed {} chars, submitted {}", echoed.len(), query.len())
    })?;
    ensure(results.is_loaded(), || {
        "results page did not load".into()
    })
}

// =============================================================================
// RUNNER
// =============================================================================

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Case id
    pub id: String,
    /// Case title
    pub title: String,
    /// Whether every check held
    pub passed: bool,
    /// Failure message
    pub error: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            passed: true,
            error: None,
            duration_ms: 0,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(scenario: &Scenario, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            ..Self::pass(scenario)
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Results from running a set of scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results, in run order
    pub results: Vec<ScenarioResult>,
    /// Total wall time in milliseconds
    pub duration_ms: u64,
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

    /// Get total count
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

/// Runs scenarios one after another, each on its own session
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    /// Stop after the first failure
    pub fail_fast: bool,
    /// Only run scenarios matching this filter
    pub filter: Option<String>,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Only run scenarios whose id or title contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Scenarios the filter selects, in catalog order
    #[must_use]
    pub fn select<'a>(&self, scenarios: &'a [Scenario]) -> Vec<&'a Scenario> {
        scenarios
            .iter()
            .filter(|s| self.filter.as_deref().map_or(true, |f| s.matches(f)))
            .collect()
    }

    /// Run the selected scenarios
    pub fn run<F>(&self, scenarios: &[Scenario], config: &SondeoConfig, factory: F) -> SuiteResults
    where
        F: FnMut() -> SondeoResult<Box<dyn Session>>,
    {
        self.run_with(scenarios, config, factory, |_| {})
    }

    /// Run the selected scenarios, reporting each result as it completes.
    ///
    /// `factory` opens a fresh session per scenario; the session is closed
    /// once the scenario returns, whatever its outcome.
    pub fn run_with<F, R>(
        &self,
        scenarios: &[Scenario],
        config: &SondeoConfig,
        mut factory: F,
        mut report: R,
    ) -> SuiteResults
    where
        F: FnMut() -> SondeoResult<Box<dyn Session>>,
        R: FnMut(&ScenarioResult),
    {
        let start = Instant::now();
        let mut results = Vec::new();

        for scenario in self.select(scenarios) {
            let began = Instant::now();
            let outcome = factory().and_then(|session| {
                let outcome = (scenario.run)(session.as_ref(), config);
                if let Err(err) = session.close() {
                    warn!(id = scenario.id, error = %err, "closing session failed");
                }
                outcome
            });
            let result = match outcome {
                Ok(()) => ScenarioResult::pass(scenario),
                Err(err) => ScenarioResult::fail(scenario, err.to_string()),
            }
            .with_duration_ms(began.elapsed().as_millis() as u64);

            info!(
                id = scenario.id,
                passed = result.passed,
                duration_ms = result.duration_ms,
                "scenario finished"
            );
            report(&result);
            let stop = self.fail_fast && !result.passed;
            results.push(result);
            if stop {
                break;
            }
        }

        SuiteResults {
            suite_name: "search".to_string(),
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{fast_config, MockDocument, MockSession};

    fn fake_sessions(config: &SondeoConfig) -> impl FnMut() -> SondeoResult<Box<dyn Session>> + '_ {
        move || Ok(Box::new(MockSession::fake(config)) as Box<dyn Session>)
    }

    fn always_fails(_: &dyn Session, _: &SondeoConfig) -> SondeoResult<()> {
        Err(SondeoError::assertion("nope"))
    }

    fn always_passes(_: &dyn Session, _: &SondeoConfig) -> SondeoResult<()> {
        Ok(())
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_ids_unique_and_ordered() {
            let ids: Vec<&str> = catalog().iter().map(|s| s.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(ids, sorted);
            assert_eq!(ids.len(), 10);
        }

        #[test]
        fn test_filter_matches_id_or_title() {
            let all = catalog();
            let runner = ScenarioRunner::new().with_filter("gs_01");
            assert_eq!(runner.select(&all).len(), 4);
            let runner = ScenarioRunner::new().with_filter("LOGO");
            let picked = runner.select(&all);
            assert_eq!(picked.len(), 1);
            assert_eq!(picked[0].id, "TC_GS_010");
        }

        #[test]
        fn test_whole_catalog_passes_on_fake_site() {
            let config = fast_config();
            let suite = ScenarioRunner::new().run(&catalog(), &config, fake_sessions(&config));
            assert!(suite.all_passed(), "failures: {:?}", suite.failures());
            assert_eq!(suite.passed_count(), 10);
        }
    }

    mod runner_tests {
        use super::*;

        fn pair() -> Vec<Scenario> {
            vec![
                Scenario {
                    id: "A",
                    title: "fails",
                    run: always_fails,
                },
                Scenario {
                    id: "B",
                    title: "passes",
                    run: always_passes,
                },
            ]
        }

        #[test]
        fn test_failures_are_collected() {
            let config = fast_config();
            let suite = ScenarioRunner::new().run(&pair(), &config, fake_sessions(&config));
            assert_eq!(suite.total(), 2);
            assert_eq!(suite.failed_count(), 1);
            assert_eq!(
                suite.failures()[0].error.as_deref(),
                Some("Assertion failed: nope")
            );
        }

        #[test]
        fn test_fail_fast_stops() {
            let config = fast_config();
            let suite = ScenarioRunner::new()
                .with_fail_fast()
                .run(&pair(), &config, fake_sessions(&config));
            assert_eq!(suite.total(), 1);
            assert!(!suite.all_passed());
        }

        #[test]
        fn test_factory_failure_fails_scenario() {
            let config = fast_config();
            let suite = ScenarioRunner::new().run(&pair()[1..], &config, || {
                Err(SondeoError::BrowserLaunch {
                    message: "no chromium".into(),
                })
            });
            assert_eq!(suite.failed_count(), 1);
        }

        #[test]
        fn test_reports_each_result_and_serializes() {
            let config = fast_config();
            let mut seen = Vec::new();
            let suite = ScenarioRunner::new().run_with(
                &pair(),
                &config,
                || Ok(Box::new(MockSession::with_document(MockDocument::new("x"))) as Box<dyn Session>),
                |r| seen.push(r.id.clone()),
            );
            assert_eq!(seen, ["A", "B"]);
            let json = serde_json::to_string(&suite).unwrap();
            let back: SuiteResults = serde_json::from_str(&json).unwrap();
            assert_eq!(back, suite);
        }
    }
}
