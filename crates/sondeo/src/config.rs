//! Configuration
//!
//! One YAML document configures a run: the site under test, wait budgets,
//! locale-dependent labels the page locators are built from, and how to
//! launch the browser.
//!
//! ```yaml
//! base_url: https://www.google.com
//! timeouts:
//!   find_ms: 10000
//!   probe_ms: 5000
//! labels:
//!   images: Зображення
//!   news: Новини
//! browser:
//!   headless: true
//! ```

use crate::result::{SondeoError, SondeoResult};
use crate::wait::{
    WaitOptions, DEFAULT_FIND_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default site under test
pub const DEFAULT_BASE_URL: &str = "https://www.google.com";

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "SONDEO_BASE_URL";

/// Environment variable overriding `browser.chromium_path`
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Wait budgets in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Strict lookup timeout
    pub find_ms: u64,
    /// Probe lookup timeout
    pub probe_ms: u64,
    /// Polling interval
    pub poll_interval_ms: u64,
    /// Pause scenarios take after an action whose effect cannot be waited on
    pub settle_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            find_ms: DEFAULT_FIND_TIMEOUT_MS,
            probe_ms: DEFAULT_PROBE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_ms: 1_000,
        }
    }
}

/// Locale-dependent visible labels the page locators are built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLabels {
    /// Brand name, used in the logo's alt text and page titles
    pub brand: String,
    /// Images tab link text
    pub images: String,
    /// News tab link text
    pub news: String,
    /// Word the result statistics text contains
    pub stats_keyword: String,
}

impl Default for SearchLabels {
    fn default() -> Self {
        Self::english()
    }
}

impl SearchLabels {
    /// English interface
    #[must_use]
    pub fn english() -> Self {
        Self {
            brand: "Google".to_string(),
            images: "Images".to_string(),
            news: "News".to_string(),
            stats_keyword: "result".to_string(),
        }
    }

    /// Ukrainian interface
    #[must_use]
    pub fn ukrainian() -> Self {
        Self {
            brand: "Google".to_string(),
            images: "Зображення".to_string(),
            news: "Новини".to_string(),
            stats_keyword: "результат".to_string(),
        }
    }

    /// Preset for a locale code (`en`, `uk`)
    pub fn for_locale(code: &str) -> SondeoResult<Self> {
        match code {
            "en" => Ok(Self::english()),
            "uk" => Ok(Self::ukrainian()),
            other => Err(SondeoError::config(format!("unknown locale {other:?}"))),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Pass `--disable-dev-shm-usage`
    pub disable_dev_shm: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            sandbox: false,
            disable_dev_shm: true,
            chromium_path: None,
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SondeoConfig {
    /// Home page of the site under test
    pub base_url: String,
    /// Wait budgets
    pub timeouts: TimeoutConfig,
    /// Locale labels
    pub labels: SearchLabels,
    /// Browser launch settings
    pub browser: BrowserConfig,
}

impl Default for SondeoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: TimeoutConfig::default(),
            labels: SearchLabels::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl SondeoConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> SondeoResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> SondeoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> SondeoResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values a run cannot work with
    pub fn validate(&self) -> SondeoResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| SondeoError::config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SondeoError::config(format!(
                "base_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(SondeoError::config("timeouts.poll_interval_ms must be > 0"));
        }
        if self.timeouts.probe_ms > self.timeouts.find_ms {
            return Err(SondeoError::config(
                "timeouts.probe_ms must not exceed timeouts.find_ms",
            ));
        }
        if self.labels.images.is_empty() || self.labels.news.is_empty() {
            return Err(SondeoError::config("tab labels must not be empty"));
        }
        Ok(())
    }

    /// Apply `SONDEO_BASE_URL` and `CHROMIUM_PATH` from the environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH).filter(|v| !v.is_empty()) {
            self.browser.chromium_path = Some(path);
        }
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the labels
    #[must_use]
    pub fn with_labels(mut self, labels: SearchLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Set the timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Wait options the engine runs with
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.timeouts.find_ms)
            .with_probe_timeout(self.timeouts.probe_ms)
            .with_poll_interval(self.timeouts.poll_interval_ms)
    }

    /// Wait options whose strict timeout is the probe timeout
    #[must_use]
    pub fn probe_options(&self) -> WaitOptions {
        self.wait_options().with_timeout(self.timeouts.probe_ms)
    }
}
