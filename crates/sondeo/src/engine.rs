//! Locator/Wait Engine
//!
//! Bridges "a locator was declared" and "the document actually contains a
//! matching, interactable node", tolerating asynchronous rendering.
//!
//! Every operation funnels through one resolution primitive, so timeout and
//! polling policy live in exactly one place. Two return contracts sit on top
//! of it:
//!
//! - **strict**: the plain [`SondeoResult`]; absence is [`SondeoError::NotFound`]
//!   and propagates to the caller
//! - **probe**: [`Probe::probe`] turns any failure into the type's default
//!   (`false`, `0`, `""`, empty vec) and never fails

use crate::locator::Locator;
use crate::result::{SondeoError, SondeoResult};
use crate::session::{ElementHandle, Session};
use crate::wait::{WaitOptions, Waiter};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Probe return contract: absence and failure become the default value.
pub trait Probe<T> {
    /// Unwrap the value, or log the failure and return `T::default()`
    fn probe(self) -> T;
}

impl<T: Default> Probe<T> for SondeoResult<T> {
    fn probe(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "probe swallowed failure");
                T::default()
            }
        }
    }
}

/// Outcome of [`Engine::click_first_interactable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The candidate at `index` (document order) was clicked
    Clicked {
        /// Position among all candidates
        index: usize,
    },
    /// No candidate qualified, or its click failed; the fallback ran
    FellBack,
}

impl Activation {
    /// Whether a candidate was clicked
    #[must_use]
    pub const fn clicked(self) -> bool {
        matches!(self, Self::Clicked { .. })
    }
}

/// Bounded-polling element operations over a shared session
#[derive(Clone, Copy)]
pub struct Engine<'s> {
    session: &'s dyn Session,
    options: WaitOptions,
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'s> Engine<'s> {
    /// Create an engine over a session
    #[must_use]
    pub fn new(session: &'s dyn Session, options: WaitOptions) -> Self {
        Self { session, options }
    }

    /// The shared session
    #[must_use]
    pub fn session(&self) -> &'s dyn Session {
        self.session
    }

    /// Wait options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Default timeout for strict operations
    #[must_use]
    pub const fn find_timeout(&self) -> Duration {
        self.options.timeout()
    }

    /// Default timeout for probe operations
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.options.probe_timeout()
    }

    /// Shared resolution primitive: poll until at least one node matches.
    fn resolve(&self, locator: &Locator, timeout: Duration) -> SondeoResult<Vec<ElementHandle>> {
        let waiter = Waiter::new(timeout, self.options.poll_interval());
        let waited = waiter
            .until(|| {
                let found = self.session.find_elements(locator)?;
                Ok((!found.is_empty()).then_some(found))
            })
            .map_err(|err| match err {
                SondeoError::Timeout { ms } => SondeoError::NotFound {
                    locator: locator.to_string(),
                    timeout_ms: ms,
                },
                other => other,
            })?;

        debug!(
            %locator,
            matches = waited.value.len(),
            attempts = waited.attempts,
            elapsed_ms = waited.elapsed.as_millis() as u64,
            "resolved"
        );
        Ok(waited.value)
    }

    /// First node matching `locator`, polling until one is present.
    pub fn find_one(&self, locator: &Locator, timeout: Duration) -> SondeoResult<ElementHandle> {
        self.resolve(locator, timeout)?
            .into_iter()
            .next()
            .ok_or_else(|| SondeoError::NotFound {
                locator: locator.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
    }

    /// All nodes matching `locator` in document order; at least one.
    pub fn find_all(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> SondeoResult<Vec<ElementHandle>> {
        self.resolve(locator, timeout)
    }

    /// Resolve, then dispatch a pointer activation
    pub fn click(&self, locator: &Locator, timeout: Duration) -> SondeoResult<()> {
        let element = self.find_one(locator, timeout)?;
        self.session.click(&element)
    }

    /// Resolve, clear any existing value, then send `text` as key input
    pub fn type_text(&self, locator: &Locator, text: &str, timeout: Duration) -> SondeoResult<()> {
        let element = self.find_one(locator, timeout)?;
        self.session.clear(&element)?;
        self.session.send_keys(&element, text)
    }

    /// Resolve, then submit the node as a keyboard Enter would
    pub fn submit(&self, locator: &Locator, timeout: Duration) -> SondeoResult<()> {
        let element = self.find_one(locator, timeout)?;
        self.session.submit(&element)
    }

    /// Resolve, then return the rendered text
    pub fn read_text(&self, locator: &Locator, timeout: Duration) -> SondeoResult<String> {
        let element = self.find_one(locator, timeout)?;
        self.session.text(&element)
    }

    /// Resolve, then read a named attribute
    pub fn read_attribute(
        &self,
        locator: &Locator,
        name: &str,
        timeout: Duration,
    ) -> SondeoResult<Option<String>> {
        let element = self.find_one(locator, timeout)?;
        self.session.attribute(&element, name)
    }

    /// Probe: whether the first match is visible. Never fails.
    pub fn is_displayed(&self, locator: &Locator, timeout: Duration) -> bool {
        self.find_one(locator, timeout)
            .and_then(|element| self.session.is_displayed(&element))
            .probe()
    }

    /// Probe: whether any match is visible. Never fails.
    pub fn is_any_displayed(&self, locator: &Locator, timeout: Duration) -> bool {
        self.find_all(locator, timeout)
            .map(|all| {
                all.iter()
                    .any(|element| matches!(self.session.is_displayed(element), Ok(true)))
            })
            .probe()
    }

    /// Probe: number of matches, `0` if none appear in time. Never fails.
    pub fn count(&self, locator: &Locator, timeout: Duration) -> usize {
        self.find_all(locator, timeout).map(|all| all.len()).probe()
    }

    /// Activate the first candidate that is both visible and enabled.
    ///
    /// All candidates matching `locator` are enumerated within the probe
    /// timeout. When none qualifies, or clicking the chosen one fails,
    /// `fallback` runs instead and its result decides the outcome.
    pub fn click_first_interactable<F>(
        &self,
        locator: &Locator,
        fallback: F,
    ) -> SondeoResult<Activation>
    where
        F: FnOnce(&Self) -> SondeoResult<()>,
    {
        let candidates = self.find_all(locator, self.probe_timeout()).probe();

        match candidates.iter().position(|el| self.is_interactable(el)) {
            Some(index) => match self.session.click(&candidates[index]) {
                Ok(()) => {
                    debug!(%locator, index, candidates = candidates.len(), "activated candidate");
                    return Ok(Activation::Clicked { index });
                }
                Err(err) => warn!(%locator, index, error = %err, "candidate click failed, falling back"),
            },
            None => warn!(
                %locator,
                candidates = candidates.len(),
                "no interactable candidate, falling back"
            ),
        }

        fallback(self)?;
        Ok(Activation::FellBack)
    }

    fn is_interactable(&self, element: &ElementHandle) -> bool {
        matches!(self.session.is_displayed(element), Ok(true))
            && matches!(self.session.is_enabled(element), Ok(true))
    }

    /// Navigate the session
    pub fn navigate(&self, url: &str) -> SondeoResult<()> {
        self.session.navigate(url)
    }

    /// Document title
    pub fn title(&self) -> SondeoResult<String> {
        self.session.title()
    }

    /// Current address
    pub fn current_url(&self) -> SondeoResult<String> {
        self.session.current_url()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockDocument, MockNode, MockSession};

    const BUTTON: Locator = Locator::name("go");
    const FIELD: Locator = Locator::name("q");
    const ABSENT: Locator = Locator::id("nowhere");

    fn fast() -> WaitOptions {
        WaitOptions::new()
            .with_timeout(200)
            .with_probe_timeout(60)
            .with_poll_interval(2)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    mod strict_tests {
        use super::*;

        #[test]
        fn test_find_one_present() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&BUTTON).with_text("Go")),
            );
            let engine = Engine::new(&session, fast());
            let el = engine.find_one(&BUTTON, ms(50)).unwrap();
            assert_eq!(session.text(&el).unwrap(), "Go");
        }

        #[test]
        fn test_find_one_first_in_document_order() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON).with_text("first"))
                    .with_node(MockNode::new(&BUTTON).with_text("second")),
            );
            let engine = Engine::new(&session, fast());
            assert_eq!(engine.read_text(&BUTTON, ms(50)).unwrap(), "first");
        }

        #[test]
        fn test_find_one_waits_for_late_node() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&BUTTON).appears_after(3)),
            );
            let engine = Engine::new(&session, fast());
            assert!(engine.find_one(&BUTTON, ms(200)).is_ok());
        }

        #[test]
        fn test_find_one_not_found() {
            let session = MockSession::with_document(MockDocument::new("t"));
            let engine = Engine::new(&session, fast());
            match engine.find_one(&ABSENT, ms(20)) {
                Err(SondeoError::NotFound {
                    locator,
                    timeout_ms,
                }) => {
                    assert_eq!(locator, "id=nowhere");
                    assert_eq!(timeout_ms, 20);
                }
                other => panic!("Expected NotFound, got {other:?}"),
            }
        }

        #[test]
        fn test_find_all_document_order() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON).with_text("a"))
                    .with_node(MockNode::new(&FIELD))
                    .with_node(MockNode::new(&BUTTON).with_text("b")),
            );
            let engine = Engine::new(&session, fast());
            let all = engine.find_all(&BUTTON, ms(50)).unwrap();
            let texts: Vec<String> = all.iter().map(|e| session.text(e).unwrap()).collect();
            assert_eq!(texts, ["a", "b"]);
        }

        #[test]
        fn test_find_all_empty_is_not_found() {
            let session = MockSession::with_document(MockDocument::new("t"));
            let engine = Engine::new(&session, fast());
            assert!(engine.find_all(&ABSENT, ms(10)).unwrap_err().is_not_found());
        }

        #[test]
        fn test_type_text_replaces_value() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&FIELD).with_value("old")),
            );
            let engine = Engine::new(&session, fast());
            engine.type_text(&FIELD, "new", ms(50)).unwrap();
            assert_eq!(
                engine.read_attribute(&FIELD, "value", ms(50)).unwrap(),
                Some("new".to_string())
            );
        }

        #[test]
        fn test_click_absent_propagates() {
            let session = MockSession::with_document(MockDocument::new("t"));
            let engine = Engine::new(&session, fast());
            assert!(engine.click(&ABSENT, ms(10)).unwrap_err().is_not_found());
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_is_displayed_visible() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&BUTTON)),
            );
            assert!(Engine::new(&session, fast()).is_displayed(&BUTTON, ms(20)));
        }

        #[test]
        fn test_is_displayed_hidden() {
            let session = MockSession::with_document(
                MockDocument::new("t").with_node(MockNode::new(&BUTTON).hidden()),
            );
            assert!(!Engine::new(&session, fast()).is_displayed(&BUTTON, ms(20)));
        }

        #[test]
        fn test_is_displayed_absent_is_false() {
            let session = MockSession::with_document(MockDocument::new("t"));
            assert!(!Engine::new(&session, fast()).is_displayed(&ABSENT, ms(10)));
        }

        #[test]
        fn test_is_any_displayed_looks_past_hidden_first() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON).hidden())
                    .with_node(MockNode::new(&BUTTON)),
            );
            let engine = Engine::new(&session, fast());
            assert!(!engine.is_displayed(&BUTTON, ms(20)));
            assert!(engine.is_any_displayed(&BUTTON, ms(20)));
            assert!(!engine.is_any_displayed(&ABSENT, ms(10)));
        }

        #[test]
        fn test_count() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON))
                    .with_node(MockNode::new(&BUTTON)),
            );
            let engine = Engine::new(&session, fast());
            assert_eq!(engine.count(&BUTTON, ms(20)), 2);
            assert_eq!(engine.count(&ABSENT, ms(10)), 0);
        }

        #[test]
        fn test_probe_trait_defaults() {
            let failed: SondeoResult<String> = Err(SondeoError::session("x"));
            assert_eq!(failed.probe(), "");
            let ok: SondeoResult<usize> = Ok(4);
            assert_eq!(ok.probe(), 4);
        }
    }

    mod interactable_tests {
        use super::*;
        use crate::mock::MockAction;

        #[test]
        fn test_skips_hidden_and_disabled() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON).hidden())
                    .with_node(MockNode::new(&BUTTON).disabled())
                    .with_node(
                        MockNode::new(&BUTTON)
                            .on_click(MockAction::Navigate("https://example.test/next".into())),
                    ),
            );
            let engine = Engine::new(&session, fast());
            let outcome = engine
                .click_first_interactable(&BUTTON, |_| panic!("fallback must not run"))
                .unwrap();
            assert_eq!(outcome, Activation::Clicked { index: 2 });
            assert_eq!(session.current_url().unwrap(), "https://example.test/next");
        }

        #[test]
        fn test_falls_back_when_none_qualifies() {
            let session = MockSession::with_document(
                MockDocument::new("t")
                    .with_node(MockNode::new(&BUTTON).hidden())
                    .with_node(MockNode::new(&FIELD)),
            );
            let engine = Engine::new(&session, fast());
            let outcome = engine
                .click_first_interactable(&BUTTON, |e| e.submit(&FIELD, ms(20)))
                .unwrap();
            assert_eq!(outcome, Activation::FellBack);
            assert!(!outcome.clicked());
            assert!(session.was_called("submit"));
        }

        #[test]
        fn test_falls_back_when_no_candidates() {
            let session = MockSession::with_document(MockDocument::new("t"));
            let engine = Engine::new(&session, fast());
            let outcome = engine.click_first_interactable(&BUTTON, |_| Ok(())).unwrap();
            assert_eq!(outcome, Activation::FellBack);
        }

        #[test]
        fn test_fallback_error_propagates() {
            let session = MockSession::with_document(MockDocument::new("t"));
            let engine = Engine::new(&session, fast());
            let result = engine.click_first_interactable(&BUTTON, |e| e.submit(&FIELD, ms(10)));
            assert!(result.unwrap_err().is_not_found());
        }
    }
}
