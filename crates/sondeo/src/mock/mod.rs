//! In-process mock session
//!
//! [`MockSession`] implements [`Session`] over scripted documents. A
//! [`MockSite`] renders a [`MockDocument`] for every address the session
//! navigates to; nodes answer to the locators they declare, can render late
//! (after N lookups), can be hidden or disabled, and carry the action a click
//! or submit triggers.
//!
//! Handles are `"{generation}:{index}"`; every navigation bumps the generation
//! so handles from a previous document are rejected as stale.

mod search_engine;

pub use search_engine::FakeSearchEngine;

use crate::config::{SondeoConfig, TimeoutConfig};
use crate::locator::Locator;
use crate::result::{SondeoError, SondeoResult};
use crate::session::{ElementHandle, Session};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// Address a fresh session starts on
pub const BLANK: &str = "about:blank";

/// Base URL the fake search engine is usually rooted at
pub const FAKE_BASE_URL: &str = "https://search.example";

/// Configuration for in-process runs: fake base URL, millisecond waits, no settling
#[must_use]
pub fn fast_config() -> SondeoConfig {
    SondeoConfig::new()
        .with_base_url(FAKE_BASE_URL)
        .with_timeouts(TimeoutConfig {
            find_ms: 500,
            probe_ms: 150,
            poll_interval_ms: 2,
            settle_ms: 0,
        })
}

// =============================================================================
// DOCUMENT MODEL
// =============================================================================

/// What a click or submit on a node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// Navigate to an address
    Navigate(String),
    /// Submit the value of `field` as the `q` parameter of `action`.
    /// An empty or blank value does not navigate.
    SubmitQuery {
        /// Field whose value is submitted
        field: Locator,
        /// Form action address
        action: String,
    },
}

/// A scripted node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    locators: Vec<Locator>,
    text: String,
    value: Option<String>,
    attributes: BTreeMap<String, String>,
    displayed: bool,
    enabled: bool,
    appears_after: u32,
    on_click: Option<MockAction>,
    on_submit: Option<MockAction>,
}

impl MockNode {
    /// Visible, enabled node answering to `locator`
    #[must_use]
    pub fn new(locator: &Locator) -> Self {
        Self {
            locators: vec![locator.clone()],
            text: String::new(),
            value: None,
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            appears_after: 0,
            on_click: None,
            on_submit: None,
        }
    }

    /// Also answer to `locator`
    #[must_use]
    pub fn also(mut self, locator: &Locator) -> Self {
        self.locators.push(locator.clone());
        self
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set editable value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Render invisibly
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Refuse interaction
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Only match from the `n`th lookup after the document loaded
    #[must_use]
    pub const fn appears_after(mut self, n: u32) -> Self {
        self.appears_after = n;
        self
    }

    /// Action a click triggers
    #[must_use]
    pub fn on_click(mut self, action: MockAction) -> Self {
        self.on_click = Some(action);
        self
    }

    /// Action a submit triggers
    #[must_use]
    pub fn on_submit(mut self, action: MockAction) -> Self {
        self.on_submit = Some(action);
        self
    }

    /// Whether this node answers to `locator`
    #[must_use]
    pub fn answers(&self, locator: &Locator) -> bool {
        self.locators.contains(locator)
    }

    /// Rendered text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Editable value
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A scripted document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockDocument {
    title: String,
    nodes: Vec<MockNode>,
}

impl MockDocument {
    /// Empty document with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node
    #[must_use]
    pub fn with_node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a node in place
    pub fn push(&mut self, node: MockNode) {
        self.nodes.push(node);
    }

    /// Drop every node answering to `locator`
    pub fn remove_all(&mut self, locator: &Locator) {
        self.nodes.retain(|node| !node.answers(locator));
    }

    /// Document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Nodes in document order
    #[must_use]
    pub fn nodes(&self) -> &[MockNode] {
        &self.nodes
    }
}

/// Renders documents for addresses
pub trait MockSite: fmt::Debug {
    /// Document served at `url`
    fn render(&self, url: &str) -> MockDocument;

    /// Hook run after key input reaches the node at `field`
    fn on_input(&self, _document: &mut MockDocument, _field: usize) {}
}

/// Serves one fixed document at [`BLANK`] and empty pages elsewhere
#[derive(Debug, Clone)]
struct StaticSite {
    document: MockDocument,
}

impl MockSite for StaticSite {
    fn render(&self, url: &str) -> MockDocument {
        if url == BLANK {
            self.document.clone()
        } else {
            MockDocument::default()
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug)]
struct MockState {
    site: Box<dyn MockSite>,
    url: String,
    document: MockDocument,
    generation: u64,
    lookups: u32,
    history: Vec<String>,
    calls: Vec<String>,
    closed: bool,
}

impl MockState {
    fn ensure_open(&self) -> SondeoResult<()> {
        if self.closed {
            return Err(SondeoError::session("session is closed"));
        }
        Ok(())
    }

    fn locate(&self, element: &ElementHandle) -> SondeoResult<usize> {
        let stale = || SondeoError::StaleElement {
            id: element.id().to_string(),
        };
        let (generation, index) = element.id().split_once(':').ok_or_else(stale)?;
        let generation: u64 = generation.parse().map_err(|_| stale())?;
        let index: usize = index.parse().map_err(|_| stale())?;
        if generation != self.generation || index >= self.document.nodes.len() {
            return Err(stale());
        }
        Ok(index)
    }

    fn go(&mut self, url: &str) {
        info!(url, "mock navigation");
        self.url = url.to_string();
        self.document = self.site.render(url);
        self.generation += 1;
        self.lookups = 0;
        self.history.push(url.to_string());
    }

    fn perform(&mut self, action: MockAction) -> SondeoResult<()> {
        match action {
            MockAction::Navigate(url) => self.go(&url),
            MockAction::SubmitQuery { field, action } => {
                let query = self
                    .document
                    .nodes
                    .iter()
                    .find(|node| node.answers(&field))
                    .and_then(|node| node.value.clone())
                    .unwrap_or_default();
                if query.trim().is_empty() {
                    debug!(%field, "blank query, submit ignored");
                    return Ok(());
                }
                let mut url = Url::parse(&action).map_err(|e| SondeoError::Navigation {
                    url: action.clone(),
                    message: e.to_string(),
                })?;
                url.query_pairs_mut().append_pair("q", &query);
                self.go(url.as_str());
            }
        }
        Ok(())
    }
}

/// Session over scripted documents
#[derive(Debug)]
pub struct MockSession {
    state: RefCell<MockState>,
}

impl MockSession {
    /// Session over a site, starting on [`BLANK`]
    #[must_use]
    pub fn new(site: impl MockSite + 'static) -> Self {
        let document = site.render(BLANK);
        Self {
            state: RefCell::new(MockState {
                site: Box::new(site),
                url: BLANK.to_string(),
                document,
                generation: 0,
                lookups: 0,
                history: Vec::new(),
                calls: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Session over a [`FakeSearchEngine`] built from `config`
    #[must_use]
    pub fn fake(config: &SondeoConfig) -> Self {
        Self::new(FakeSearchEngine::from_config(config))
    }

    /// Session showing one fixed document
    #[must_use]
    pub fn with_document(document: MockDocument) -> Self {
        Self::new(StaticSite { document })
    }

    /// Addresses navigated to, in order
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Session calls, as `method` or `method:argument`
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .borrow()
            .calls
            .iter()
            .any(|c| c.split(':').next() == Some(method))
    }

    /// Whether [`Session::close`] ran
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    fn record(&self, call: String) -> SondeoResult<std::cell::RefMut<'_, MockState>> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.push(call);
        Ok(state)
    }

    fn read<T>(&self, element: &ElementHandle, f: impl FnOnce(&MockNode) -> T) -> SondeoResult<T> {
        let state = self.state.borrow();
        state.ensure_open()?;
        let index = state.locate(element)?;
        Ok(f(&state.document.nodes[index]))
    }
}

impl Session for MockSession {
    fn navigate(&self, url: &str) -> SondeoResult<()> {
        let mut state = self.record(format!("navigate:{url}"))?;
        state.go(url);
        Ok(())
    }

    fn find_elements(&self, locator: &Locator) -> SondeoResult<Vec<ElementHandle>> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.lookups += 1;
        let generation = state.generation;
        let lookups = state.lookups;
        Ok(state
            .document
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.answers(locator) && node.appears_after <= lookups)
            .map(|(index, _)| ElementHandle::new(format!("{generation}:{index}")))
            .collect())
    }

    fn click(&self, element: &ElementHandle) -> SondeoResult<()> {
        let mut state = self.record(format!("click:{}", element.id()))?;
        let index = state.locate(element)?;
        let node = &state.document.nodes[index];
        if !node.displayed || !node.enabled {
            return Err(SondeoError::session(format!(
                "element {} is not interactable",
                element.id()
            )));
        }
        match node.on_click.clone() {
            Some(action) => state.perform(action),
            None => Ok(()),
        }
    }

    fn clear(&self, element: &ElementHandle) -> SondeoResult<()> {
        let mut state = self.record(format!("clear:{}", element.id()))?;
        let index = state.locate(element)?;
        state.document.nodes[index].value = Some(String::new());
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> SondeoResult<()> {
        let mut state = self.record(format!("send_keys:{}", element.id()))?;
        let index = state.locate(element)?;
        state.document.nodes[index]
            .value
            .get_or_insert_with(String::new)
            .push_str(text);
        let MockState { site, document, .. } = &mut *state;
        site.on_input(document, index);
        Ok(())
    }

    fn submit(&self, element: &ElementHandle) -> SondeoResult<()> {
        let mut state = self.record(format!("submit:{}", element.id()))?;
        let index = state.locate(element)?;
        match state.document.nodes[index].on_submit.clone() {
            Some(action) => state.perform(action),
            None => Ok(()),
        }
    }

    fn text(&self, element: &ElementHandle) -> SondeoResult<String> {
        self.read(element, |node| node.text.clone())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> SondeoResult<Option<String>> {
        self.read(element, |node| match name {
            "value" => node.value.clone(),
            other => node.attributes.get(other).cloned(),
        })
    }

    fn is_displayed(&self, element: &ElementHandle) -> SondeoResult<bool> {
        self.read(element, |node| node.displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> SondeoResult<bool> {
        self.read(element, |node| node.enabled)
    }

    fn title(&self) -> SondeoResult<String> {
        let state = self.state.borrow();
        state.ensure_open()?;
        Ok(state.document.title.clone())
    }

    fn current_url(&self) -> SondeoResult<String> {
        let state = self.state.borrow();
        state.ensure_open()?;
        Ok(state.url.clone())
    }

    fn close(&self) -> SondeoResult<()> {
        let mut state = self.record("close".to_string())?;
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const FIELD: Locator = Locator::name("q");
    const GO: Locator = Locator::name("go");

    fn form() -> MockDocument {
        MockDocument::new("form")
            .with_node(MockNode::new(&FIELD).with_value("").on_submit(MockAction::SubmitQuery {
                field: FIELD,
                action: "https://example.test/search".into(),
            }))
            .with_node(MockNode::new(&GO).on_click(MockAction::Navigate(
                "https://example.test/elsewhere".into(),
            )))
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_matches_by_locator_equality() {
            let session = MockSession::with_document(form());
            assert_eq!(session.find_elements(&FIELD).unwrap().len(), 1);
            assert!(session.find_elements(&Locator::id("q")).unwrap().is_empty());
        }

        #[test]
        fn test_also_answers_second_locator() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&FIELD).also(&GO)),
            );
            assert_eq!(
                session.find_elements(&FIELD).unwrap(),
                session.find_elements(&GO).unwrap()
            );
        }

        #[test]
        fn test_late_node_renders_on_nth_lookup() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&GO).appears_after(2)),
            );
            assert!(session.find_elements(&GO).unwrap().is_empty());
            assert_eq!(session.find_elements(&GO).unwrap().len(), 1);
        }
    }

    mod handle_tests {
        use super::*;

        #[test]
        fn test_handle_stale_after_navigation() {
            let session = MockSession::with_document(form());
            let el = session.find_elements(&GO).unwrap().remove(0);
            session.navigate("https://example.test/").unwrap();
            match session.text(&el) {
                Err(SondeoError::StaleElement { id }) => assert_eq!(id, el.id()),
                other => panic!("Expected StaleElement, got {other:?}"),
            }
        }

        #[test]
        fn test_malformed_handle_is_stale() {
            let session = MockSession::with_document(form());
            let bogus = ElementHandle::new("nope");
            assert!(matches!(
                session.is_displayed(&bogus),
                Err(SondeoError::StaleElement { .. })
            ));
        }

        #[test]
        fn test_hidden_node_rejects_click() {
            let session =
                MockSession::with_document(MockDocument::new("t").with_node(MockNode::new(&GO).hidden()));
            let el = session.find_elements(&GO).unwrap().remove(0);
            assert!(matches!(session.click(&el), Err(SondeoError::Session { .. })));
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_click_navigates() {
            let session = MockSession::with_document(form());
            let el = session.find_elements(&GO).unwrap().remove(0);
            session.click(&el).unwrap();
            assert_eq!(session.current_url().unwrap(), "https://example.test/elsewhere");
            assert_eq!(session.history(), ["https://example.test/elsewhere"]);
        }

        #[test]
        fn test_submit_encodes_query() {
            let session = MockSession::with_document(form());
            let el = session.find_elements(&FIELD).unwrap().remove(0);
            session.send_keys(&el, "rust lang & co").unwrap();
            session.submit(&el).unwrap();
            let url = Url::parse(&session.current_url().unwrap()).unwrap();
            let q = url.query_pairs().find(|(k, _)| k == "q").unwrap().1;
            assert_eq!(q, "rust lang & co");
        }

        #[test]
        fn test_blank_submit_stays() {
            let session = MockSession::with_document(form());
            let el = session.find_elements(&FIELD).unwrap().remove(0);
            session.send_keys(&el, "   ").unwrap();
            session.submit(&el).unwrap();
            assert_eq!(session.current_url().unwrap(), BLANK);
            assert!(session.history().is_empty());
        }

        #[test]
        fn test_clear_then_type() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&FIELD).with_value("old")),
            );
            let el = session.find_elements(&FIELD).unwrap().remove(0);
            session.clear(&el).unwrap();
            session.send_keys(&el, "new").unwrap();
            assert_eq!(session.attribute(&el, "value").unwrap().as_deref(), Some("new"));
            assert!(session.was_called("clear"));
            assert!(session.was_called("send_keys"));
            assert!(!session.was_called("submit"));
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_closed_session_rejects_calls() {
            let session = MockSession::with_document(form());
            session.close().unwrap();
            assert!(session.is_closed());
            assert!(session.title().is_err());
            assert!(session.find_elements(&FIELD).is_err());
        }
    }
}
