//! Results page.
//!
//! Most accessors here are probes: when the block they read has not rendered
//! they degrade to `""`, `0` or `false` instead of failing. Only
//! [`ResultsPage::echoed_query_value`] assumes presence and propagates
//! `NotFound`.

use crate::config::{SearchLabels, SondeoConfig};
use crate::engine::Probe;
use crate::locator::{xpath_literal, By, Locator};
use crate::page_object::{BasePage, PageObject};
use crate::result::SondeoResult;
use crate::session::Session;
use std::time::Duration;
use tracing::debug;

/// The page shown after a search is submitted
#[derive(Debug, Clone)]
pub struct ResultsPage<'s> {
    base: BasePage<'s>,
    images_tab_active: Locator,
    news_tab_active: Locator,
    images_link: Locator,
    news_link: Locator,
}

impl<'s> ResultsPage<'s> {
    /// Result-count statistics block
    pub const RESULT_STATS: Locator = Locator::id("result-stats");
    /// Result containers
    pub const RESULT_ITEMS: Locator = Locator::xpath("//div[@class='g']");
    /// Heading of the first result container
    pub const FIRST_RESULT_TITLE: Locator = Locator::xpath("(//div[@class='g']//h3)[1]");
    /// Next-page control
    pub const NEXT_PAGE: Locator = Locator::id("pnnext");
    /// Query input as re-rendered on this page
    pub const SEARCH_INPUT: Locator = Locator::name("q");
    /// Brand logo on the results header
    pub const LOGO: Locator = Locator::id("logo");
    /// Thumbnails of the images tab
    pub const IMAGE_THUMBNAILS: Locator = Locator::xpath("//img[contains(@class, 'Q4LuWd')]");

    /// Attach to the page the session is already showing
    #[must_use]
    pub fn attach(session: &'s dyn Session, config: &SondeoConfig) -> Self {
        Self::from_base(BasePage::new(session, config.wait_options()), &config.labels)
    }

    fn from_base(base: BasePage<'s>, labels: &SearchLabels) -> Self {
        Self {
            base,
            images_tab_active: Self::tab_active_locator(&labels.images),
            news_tab_active: Self::tab_active_locator(&labels.news),
            images_link: Locator::link_text(labels.images.as_str()),
            news_link: Locator::link_text(labels.news.as_str()),
        }
    }

    /// Tab anchor whose aria-label contains `label` and that is selected
    #[must_use]
    pub fn tab_active_locator(label: &str) -> Locator {
        Locator::owned(
            By::XPath,
            format!(
                "//a[contains(@aria-label, {}) and @aria-selected='true']",
                xpath_literal(label)
            ),
        )
    }

    /// Selected-images-tab indicator
    #[must_use]
    pub const fn images_tab_active(&self) -> &Locator {
        &self.images_tab_active
    }

    /// Selected-news-tab indicator
    #[must_use]
    pub const fn news_tab_active(&self) -> &Locator {
        &self.news_tab_active
    }

    /// Statistics text if the block is displayed, else `""`
    pub fn result_stats_text(&self) -> String {
        if !self.base.is_element_displayed(&Self::RESULT_STATS) {
            return String::new();
        }
        self.base.get_text(&Self::RESULT_STATS).probe()
    }

    /// Number of rendered result containers, `0` when none appear in time
    pub fn count_results(&self) -> usize {
        let engine = self.base.engine();
        let count = engine.count(&Self::RESULT_ITEMS, engine.probe_timeout());
        debug!(count, "counted results");
        count
    }

    /// Heading text of the first result, `""` if absent
    pub fn first_result_title(&self) -> String {
        if !self.base.is_element_displayed(&Self::FIRST_RESULT_TITLE) {
            return String::new();
        }
        self.base.get_text(&Self::FIRST_RESULT_TITLE).probe()
    }

    /// Images tab is present and selected
    pub fn is_images_tab_active(&self) -> bool {
        self.base.is_element_displayed(&self.images_tab_active)
    }

    /// News tab is present and selected
    pub fn is_news_tab_active(&self) -> bool {
        self.base.is_element_displayed(&self.news_tab_active)
    }

    /// Click the next-page control if it is displayed.
    ///
    /// `Ok(false)` means there was no control and nothing happened.
    pub fn click_next_page(&self) -> SondeoResult<bool> {
        if !self.base.is_element_displayed(&Self::NEXT_PAGE) {
            debug!("no next-page control");
            return Ok(false);
        }
        self.base.click_element(&Self::NEXT_PAGE)?;
        Ok(true)
    }

    /// Value of the echoed query input. Fails with `NotFound` when absent.
    pub fn echoed_query_value(&self) -> SondeoResult<String> {
        self.base
            .get_attribute(&Self::SEARCH_INPUT, "value")
            .map(Option::unwrap_or_default)
    }

    /// Switch to the images tab
    pub fn click_images_tab(&self) -> SondeoResult<()> {
        self.base.click_element(&self.images_link)
    }

    /// Switch to the news tab
    pub fn click_news_tab(&self) -> SondeoResult<()> {
        self.base.click_element(&self.news_link)
    }

    /// Return to the search page through the logo
    pub fn click_logo(&self) -> SondeoResult<()> {
        self.base.click_element(&Self::LOGO)
    }

    /// Probe image thumbnails within `timeout`
    pub fn are_image_results_visible(&self, timeout: Duration) -> bool {
        self.base
            .is_element_displayed_within(&Self::IMAGE_THUMBNAILS, timeout)
    }
}

impl PageObject for ResultsPage<'_> {
    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn page_name(&self) -> &'static str {
        "results"
    }

    fn url_pattern(&self) -> &str {
        "/search"
    }

    fn landmarks(&self) -> Vec<Locator> {
        vec![Self::SEARCH_INPUT, Self::LOGO]
    }
}
