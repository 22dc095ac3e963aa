//! Session - the browser-driving seam
//!
//! Everything the engine needs from a browser goes through [`Session`]:
//! navigate, evaluate a locator against the live document, dispatch input on
//! a node, and report node and document state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Session (trait)                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐          ┌────────────────────────┐  │
//! │  │  ChromiumSession   │          │  MockSession           │  │
//! │  │  (feature=browser) │          │  (scripted documents)  │  │
//! │  │  CDP via           │          │  used by unit and      │  │
//! │  │  chromiumoxide     │          │  integration tests     │  │
//! │  └────────────────────┘          └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods take `&self`: one session is shared by reference between all page
//! objects of a test case, and backends keep their mutable state behind
//! interior mutability. Sessions are driven from a single thread.

use crate::locator::Locator;
use crate::result::SondeoResult;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Opaque, short-lived reference to a located node.
///
/// Valid only until the page it belongs to navigates; backends reject stale
/// handles with [`SondeoError::StaleElement`](crate::SondeoError::StaleElement).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Create a handle from a backend-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Backend-assigned id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A live browser-driving connection.
pub trait Session {
    /// Navigate to an address and wait for the load to finish
    fn navigate(&self, url: &str) -> SondeoResult<()>;

    /// Evaluate a locator against the current document, without waiting.
    ///
    /// Returns every match in document order; no match is `Ok(vec![])`.
    fn find_elements(&self, locator: &Locator) -> SondeoResult<Vec<ElementHandle>>;

    /// Dispatch a pointer activation on the node
    fn click(&self, element: &ElementHandle) -> SondeoResult<()>;

    /// Clear the node's editable value
    fn clear(&self, element: &ElementHandle) -> SondeoResult<()>;

    /// Send text to the node as key input
    fn send_keys(&self, element: &ElementHandle, text: &str) -> SondeoResult<()>;

    /// Submit the node as if Enter was pressed in it
    fn submit(&self, element: &ElementHandle) -> SondeoResult<()>;

    /// Rendered text content of the node
    fn text(&self, element: &ElementHandle) -> SondeoResult<String>;

    /// Named attribute (or live property, for `value`) of the node
    fn attribute(&self, element: &ElementHandle, name: &str) -> SondeoResult<Option<String>>;

    /// Whether the node is rendered visibly
    fn is_displayed(&self, element: &ElementHandle) -> SondeoResult<bool>;

    /// Whether the node accepts interaction
    fn is_enabled(&self, element: &ElementHandle) -> SondeoResult<bool>;

    /// Document title
    fn title(&self) -> SondeoResult<String>;

    /// Current address
    fn current_url(&self) -> SondeoResult<String>;

    /// End the session
    fn close(&self) -> SondeoResult<()> {
        Ok(())
    }
}

/// Share one session between the code driving it and the code inspecting it
impl<S: Session + ?Sized> Session for Rc<S> {
    fn navigate(&self, url: &str) -> SondeoResult<()> {
        (**self).navigate(url)
    }

    fn find_elements(&self, locator: &Locator) -> SondeoResult<Vec<ElementHandle>> {
        (**self).find_elements(locator)
    }

    fn click(&self, element: &ElementHandle) -> SondeoResult<()> {
        (**self).click(element)
    }

    fn clear(&self, element: &ElementHandle) -> SondeoResult<()> {
        (**self).clear(element)
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> SondeoResult<()> {
        (**self).send_keys(element, text)
    }

    fn submit(&self, element: &ElementHandle) -> SondeoResult<()> {
        (**self).submit(element)
    }

    fn text(&self, element: &ElementHandle) -> SondeoResult<String> {
        (**self).text(element)
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> SondeoResult<Option<String>> {
        (**self).attribute(element, name)
    }

    fn is_displayed(&self, element: &ElementHandle) -> SondeoResult<bool> {
        (**self).is_displayed(element)
    }

    fn is_enabled(&self, element: &ElementHandle) -> SondeoResult<bool> {
        (**self).is_enabled(element)
    }

    fn title(&self) -> SondeoResult<String> {
        (**self).title()
    }

    fn current_url(&self) -> SondeoResult<String> {
        (**self).current_url()
    }

    fn close(&self) -> SondeoResult<()> {
        (**self).close()
    }
}
