//! Page Object Model Support
//!
//! [`BasePage`] supplies the common element operations every concrete page
//! composes; [`PageObject`] is what a concrete page declares about itself.
//!
//! A page object borrows the one session of its test case and holds only
//! locators. It is created when control logically arrives at the page, either
//! by navigating there ([`BasePage::open`]) or by attaching to the page a
//! prior action produced ([`BasePage::new`]).

use crate::engine::{Engine, Probe};
use crate::locator::Locator;
use crate::result::SondeoResult;
use crate::session::{ElementHandle, Session};
use crate::wait::WaitOptions;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Trait for page objects representing a page of the site under test.
///
/// # Example
///
/// ```
/// use sondeo::prelude::*;
///
/// struct AboutPage<'s> {
///     base: BasePage<'s>,
/// }
///
/// impl AboutPage<'_> {
///     const HEADING: Locator = Locator::id("about");
/// }
///
/// impl PageObject for AboutPage<'_> {
///     fn base(&self) -> &BasePage<'_> {
///         &self.base
///     }
///
///     fn page_name(&self) -> &'static str {
///         "about"
///     }
///
///     fn url_pattern(&self) -> &str {
///         "/about"
///     }
///
///     fn landmarks(&self) -> Vec<Locator> {
///         vec![Self::HEADING]
///     }
/// }
/// ```
pub trait PageObject {
    /// Shared element operations
    fn base(&self) -> &BasePage<'_>;

    /// Page name for logging
    fn page_name(&self) -> &'static str;

    /// Literal path of the page's address (e.g. "/", "/search")
    fn url_pattern(&self) -> &str;

    /// Locators whose visibility identifies the page
    fn landmarks(&self) -> Vec<Locator>;

    /// Every landmark probes visible
    fn is_loaded(&self) -> bool {
        let base = self.base();
        self.landmarks()
            .iter()
            .all(|locator| base.is_element_displayed(locator))
    }

    /// The session's current address matches [`Self::url_pattern`]
    fn matches_current_url(&self) -> bool {
        self.base()
            .current_url()
            .map(|url| UrlMatcher::new(self.url_pattern()).matches(&url))
            .probe()
    }

    /// Document title
    fn title(&self) -> SondeoResult<String> {
        self.base().title()
    }
}

/// Common element operations over the engine, with the configured timeouts
#[derive(Debug, Clone, Copy)]
pub struct BasePage<'s> {
    engine: Engine<'s>,
}

impl<'s> BasePage<'s> {
    /// Attach to whatever page the session is showing
    #[must_use]
    pub fn new(session: &'s dyn Session, options: WaitOptions) -> Self {
        Self {
            engine: Engine::new(session, options),
        }
    }

    /// Navigate to `url`, then attach
    pub fn open(session: &'s dyn Session, url: &str, options: WaitOptions) -> SondeoResult<Self> {
        info!(url, "opening page");
        session.navigate(url)?;
        Ok(Self::new(session, options))
    }

    /// Underlying engine
    #[must_use]
    pub const fn engine(&self) -> &Engine<'s> {
        &self.engine
    }

    /// First match, within the strict timeout
    pub fn find_element(&self, locator: &Locator) -> SondeoResult<ElementHandle> {
        self.engine.find_one(locator, self.engine.find_timeout())
    }

    /// All matches, within the strict timeout
    pub fn find_elements(&self, locator: &Locator) -> SondeoResult<Vec<ElementHandle>> {
        self.engine.find_all(locator, self.engine.find_timeout())
    }

    /// Click the first match
    pub fn click_element(&self, locator: &Locator) -> SondeoResult<()> {
        self.engine.click(locator, self.engine.find_timeout())
    }

    /// Replace the first match's value with `text`
    pub fn enter_text(&self, locator: &Locator, text: &str) -> SondeoResult<()> {
        self.engine.type_text(locator, text, self.engine.find_timeout())
    }

    /// Submit the first match
    pub fn submit(&self, locator: &Locator) -> SondeoResult<()> {
        self.engine.submit(locator, self.engine.find_timeout())
    }

    /// Rendered text of the first match
    pub fn get_text(&self, locator: &Locator) -> SondeoResult<String> {
        self.engine.read_text(locator, self.engine.find_timeout())
    }

    /// Named attribute of the first match
    pub fn get_attribute(&self, locator: &Locator, name: &str) -> SondeoResult<Option<String>> {
        self.engine
            .read_attribute(locator, name, self.engine.find_timeout())
    }

    /// Probe visibility within the probe timeout
    pub fn is_element_displayed(&self, locator: &Locator) -> bool {
        self.engine.is_displayed(locator, self.engine.probe_timeout())
    }

    /// Probe visibility within `timeout`
    pub fn is_element_displayed_within(&self, locator: &Locator, timeout: Duration) -> bool {
        self.engine.is_displayed(locator, timeout)
    }

    /// Document title
    pub fn title(&self) -> SondeoResult<String> {
        self.engine.title()
    }

    /// Current address
    pub fn current_url(&self) -> SondeoResult<String> {
        self.engine.current_url()
    }
}

// =============================================================================
// URL MATCHING
// =============================================================================

/// Matches address paths against a page's literal path pattern
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    segments: Vec<String>,
}

impl UrlMatcher {
    /// Create a matcher for a literal path such as `/search` or `/`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: Self::split(pattern),
        }
    }

    fn split(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether the address's path matches; query and fragment are ignored
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path = Url::parse(url).map_or_else(|_| url.to_string(), |u| u.path().to_string());
        Self::split(&path) == self.segments
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDocument, MockNode, MockSession};

    const HEADING: Locator = Locator::id("heading");
    const FIELD: Locator = Locator::name("q");

    fn fast() -> WaitOptions {
        WaitOptions::new()
            .with_timeout(100)
            .with_probe_timeout(30)
            .with_poll_interval(2)
    }

    struct TestPage<'s> {
        base: BasePage<'s>,
    }

    impl PageObject for TestPage<'_> {
        fn base(&self) -> &BasePage<'_> {
            &self.base
        }

        fn page_name(&self) -> &'static str {
            "test"
        }

        fn url_pattern(&self) -> &str {
            "/"
        }

        fn landmarks(&self) -> Vec<Locator> {
            vec![HEADING, FIELD]
        }
    }

    mod base_page_tests {
        use super::*;

        #[test]
        fn test_enter_text_and_read_back() {
            let session = MockSession::with_document(
                MockDocument::new("Home").with_node(MockNode::new(&FIELD).with_value("x")),
            );
            let base = BasePage::new(&session, fast());
            base.enter_text(&FIELD, "rust").unwrap();
            assert_eq!(
                base.get_attribute(&FIELD, "value").unwrap().as_deref(),
                Some("rust")
            );
            assert_eq!(base.title().unwrap(), "Home");
        }

        #[test]
        fn test_open_navigates() {
            let session = MockSession::with_document(MockDocument::new("Home"));
            let base = BasePage::open(&session, "https://example.test/", fast()).unwrap();
            assert_eq!(base.current_url().unwrap(), "https://example.test/");
            assert!(session.was_called("navigate"));
        }

        #[test]
        fn test_get_text_absent_is_not_found() {
            let session = MockSession::with_document(MockDocument::new("Home"));
            let base = BasePage::new(&session, fast());
            assert!(base.get_text(&HEADING).unwrap_err().is_not_found());
        }

        #[test]
        fn test_displayed_within_explicit_timeout() {
            let session = MockSession::with_document(
                MockDocument::new("Home").with_node(MockNode::new(&HEADING).appears_after(4)),
            );
            let base = BasePage::new(&session, fast());
            assert!(base.is_element_displayed_within(&HEADING, Duration::from_millis(200)));
        }
    }

    mod page_object_tests {
        use super::*;

        #[test]
        fn test_is_loaded_needs_every_landmark() {
            let full = MockSession::with_document(
                MockDocument::new("Home")
                    .with_node(MockNode::new(&HEADING))
                    .with_node(MockNode::new(&FIELD)),
            );
            let page = TestPage {
                base: BasePage::new(&full, fast()),
            };
            assert!(page.is_loaded());

            let partial = MockSession::with_document(
                MockDocument::new("Home").with_node(MockNode::new(&HEADING)),
            );
            let page = TestPage {
                base: BasePage::new(&partial, fast()),
            };
            assert!(!page.is_loaded());
        }

        #[test]
        fn test_matches_current_url() {
            let session = MockSession::with_document(MockDocument::new("Home"));
            session.navigate("https://example.test/?hl=uk").unwrap();
            let page = TestPage {
                base: BasePage::new(&session, fast()),
            };
            assert!(page.matches_current_url());
            assert_eq!(page.title().unwrap(), "");
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match_ignores_query() {
            let matcher = UrlMatcher::new("/search");
            assert!(matcher.matches("https://www.google.com/search?q=rust"));
            assert!(matcher.matches("/search"));
            assert!(!matcher.matches("https://www.google.com/"));
        }

        #[test]
        fn test_root_pattern() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("https://www.google.com/"));
            assert!(matcher.matches("https://www.google.com/#"));
            assert!(!matcher.matches("https://www.google.com/search"));
        }

        #[test]
        fn test_segment_count_must_agree() {
            let matcher = UrlMatcher::new("/search/");
            assert!(matcher.matches("https://www.google.com/search"));
            assert!(!matcher.matches("https://www.google.com/search/extra"));
            assert!(!matcher.matches("https://www.google.com/imghp"));
        }
    }
}
