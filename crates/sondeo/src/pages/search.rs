//! Search (home) page.

use crate::config::{SearchLabels, SondeoConfig};
use crate::engine::{Activation, Probe};
use crate::locator::{xpath_literal, By, Locator};
use crate::page_object::{BasePage, PageObject};
use crate::result::SondeoResult;
use crate::session::Session;
use std::time::Duration;
use tracing::debug;

/// The search engine's entry page
#[derive(Debug, Clone)]
pub struct SearchPage<'s> {
    base: BasePage<'s>,
    logo: Locator,
    images_link: Locator,
    news_link: Locator,
}

impl<'s> SearchPage<'s> {
    /// Query input
    pub const SEARCH_INPUT: Locator = Locator::name("q");
    /// Primary search trigger; may render as several candidates
    pub const SEARCH_BUTTON: Locator = Locator::name("btnK");
    /// "Feeling lucky" trigger
    pub const LUCKY_BUTTON: Locator = Locator::name("btnI");
    /// Entries of the suggestion list under the input
    pub const SUGGESTIONS: Locator = Locator::xpath("//ul[@role='listbox']/li");

    /// Navigate to `config.base_url` and attach
    pub fn open(session: &'s dyn Session, config: &SondeoConfig) -> SondeoResult<Self> {
        let base = BasePage::open(session, &config.base_url, config.wait_options())?;
        Ok(Self::from_base(base, &config.labels))
    }

    /// Attach to the page the session is already showing
    #[must_use]
    pub fn attach(session: &'s dyn Session, config: &SondeoConfig) -> Self {
        Self::from_base(BasePage::new(session, config.wait_options()), &config.labels)
    }

    fn from_base(base: BasePage<'s>, labels: &SearchLabels) -> Self {
        Self {
            base,
            logo: Self::logo_locator(labels),
            images_link: Locator::link_text(labels.images.as_str()),
            news_link: Locator::link_text(labels.news.as_str()),
        }
    }

    /// Brand logo image, by its alt text
    #[must_use]
    pub fn logo_locator(labels: &SearchLabels) -> Locator {
        Locator::owned(
            By::XPath,
            format!("//img[@alt={}]", xpath_literal(&labels.brand)),
        )
    }

    /// Brand logo
    #[must_use]
    pub const fn logo(&self) -> &Locator {
        &self.logo
    }

    /// Images tab link
    #[must_use]
    pub const fn images_link(&self) -> &Locator {
        &self.images_link
    }

    /// News tab link
    #[must_use]
    pub const fn news_link(&self) -> &Locator {
        &self.news_link
    }

    /// Replace the query input's value
    pub fn enter_search_query(&self, query: &str) -> SondeoResult<()> {
        debug!(chars = query.chars().count(), "entering query");
        self.base.enter_text(&Self::SEARCH_INPUT, query)
    }

    /// Activate the first visible, enabled trigger; submit the input otherwise.
    pub fn click_search_button(&self) -> SondeoResult<Activation> {
        self.base
            .engine()
            .click_first_interactable(&Self::SEARCH_BUTTON, |engine| {
                engine.submit(&Self::SEARCH_INPUT, engine.find_timeout())
            })
    }

    /// Enter `query` and trigger the search
    pub fn search(&self, query: &str) -> SondeoResult<Activation> {
        self.enter_search_query(query)?;
        self.click_search_button()
    }

    /// Activate the first visible, enabled "lucky" trigger, if any
    pub fn click_lucky_button(&self) -> SondeoResult<bool> {
        self.base
            .engine()
            .click_first_interactable(&Self::LUCKY_BUTTON, |_| Ok(()))
            .map(Activation::clicked)
    }

    /// Current value of the query input; a missing value reads as `""`
    pub fn get_search_input_value(&self) -> SondeoResult<String> {
        self.base
            .get_attribute(&Self::SEARCH_INPUT, "value")
            .map(Option::unwrap_or_default)
    }

    /// The input and at least one trigger candidate are visible
    pub fn are_search_elements_visible(&self) -> bool {
        let engine = self.base.engine();
        self.base.is_element_displayed(&Self::SEARCH_INPUT)
            && engine.is_any_displayed(&Self::SEARCH_BUTTON, engine.probe_timeout())
    }

    /// Click the images tab link
    pub fn click_images_link(&self) -> SondeoResult<()> {
        self.base.click_element(&self.images_link)
    }

    /// Click the news tab link
    pub fn click_news_link(&self) -> SondeoResult<()> {
        self.base.click_element(&self.news_link)
    }

    /// Click the brand logo
    pub fn click_logo(&self) -> SondeoResult<()> {
        self.base.click_element(&self.logo)
    }

    /// Probe the suggestion list within `timeout`
    pub fn are_suggestions_visible(&self, timeout: Duration) -> bool {
        self.base
            .is_element_displayed_within(&Self::SUGGESTIONS, timeout)
    }

    /// Text of every suggestion, empty when none render
    pub fn suggestions(&self) -> Vec<String> {
        let engine = self.base.engine();
        engine
            .find_all(&Self::SUGGESTIONS, engine.probe_timeout())
            .and_then(|entries| {
                entries
                    .iter()
                    .map(|entry| engine.session().text(entry))
                    .collect::<SondeoResult<Vec<_>>>()
            })
            .probe()
    }
}

impl PageObject for SearchPage<'_> {
    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn page_name(&self) -> &'static str {
        "search"
    }

    fn url_pattern(&self) -> &str {
        "/"
    }

    fn landmarks(&self) -> Vec<Locator> {
        vec![Self::SEARCH_INPUT, self.logo.clone()]
    }
}
