//! Sondeo: page objects and a bounded-wait locator engine for search engine
//! UI regression tests.
//!
//! Sondeo (Spanish: "probe, sounding") drives a search front end through two
//! page objects built on one polling primitive.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SONDEO Architecture                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Locator/   │            │
//! │   │ catalog    │───►│ Objects    │───►│ Wait       │            │
//! │   │ (TC_GS_*)  │    │ search,    │    │ Engine     │            │
//! │   └────────────┘    │ results    │    └─────┬──────┘            │
//! │                     └────────────┘          │ Session           │
//! │                               ┌─────────────┴──────────┐        │
//! │                               ▼                        ▼        │
//! │                        ┌────────────┐          ┌────────────┐   │
//! │                        │ Chromium   │          │ Mock       │   │
//! │                        │ (CDP)      │          │ (in-proc)  │   │
//! │                        └────────────┘          └────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sondeo::prelude::*;
//!
//! let config = sondeo::mock::fast_config();
//! let session = MockSession::fake(&config);
//!
//! let home = SearchPage::open(&session, &config)?;
//! home.search("Selenium")?;
//!
//! let results = ResultsPage::attach(&session, &config);
//! assert!(results.count_results() > 0);
//! assert_eq!(results.echoed_query_value()?, "Selenium");
//! # Ok::<(), SondeoError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod engine;
#[cfg(any(feature = "browser", test))]
mod handles;
pub mod locator;
pub mod mock;
#[allow(clippy::missing_errors_doc)]
pub mod page_object;
#[allow(clippy::missing_errors_doc)]
pub mod pages;
pub mod result;
#[allow(clippy::missing_errors_doc)]
pub mod scenario;
#[allow(clippy::missing_errors_doc)]
pub mod session;
pub mod wait;

/// Chromium session over CDP
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod browser;

pub use config::{BrowserConfig, SearchLabels, SondeoConfig, TimeoutConfig};
pub use engine::{Activation, Engine, Probe};
pub use locator::{By, Locator};
pub use result::{SondeoError, SondeoResult};
pub use session::{ElementHandle, Session};

/// Common imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::browser::ChromiumSession;
    pub use super::config::*;
    pub use super::engine::*;
    pub use super::locator::*;
    pub use super::mock::{FakeSearchEngine, MockSession};
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::scenario::{catalog, Scenario, ScenarioResult, ScenarioRunner, SuiteResults};
    pub use super::session::*;
    pub use super::wait::*;
}
