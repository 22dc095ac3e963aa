//! Locator abstraction for element selection.
//!
//! A locator is an immutable (strategy, selector) pair. Pages declare their
//! locators as associated constants; the engine re-resolves them on every
//! call so element handles never outlive the document they came from.
//!
//! # Design Philosophy
//!
//! - **Declarative**: a locator says *how* to find nodes, never holds a node
//! - **Const-friendly**: static selectors need no allocation
//! - **Backend-neutral**: every strategy lowers to an XPath or CSS query

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Strategy used to match nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// Anchor whose visible text equals the selector
    LinkText,
    /// Anchor whose visible text contains the selector
    PartialLinkText,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Element tag name
    TagName,
    /// One of the element's classes
    ClassName,
}

impl By {
    /// Short name used in the `by=selector` display form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::TagName => "tag name",
            Self::ClassName => "class name",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query a backend can evaluate against the live document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

/// A declarative (strategy, selector) pair identifying UI nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    selector: Cow<'static, str>,
}

impl Locator {
    /// Create a locator from a strategy and a static selector
    #[must_use]
    pub const fn new(by: By, selector: &'static str) -> Self {
        Self {
            by,
            selector: Cow::Borrowed(selector),
        }
    }

    /// Create a locator whose selector is only known at runtime
    #[must_use]
    pub fn owned(by: By, selector: impl Into<String>) -> Self {
        Self {
            by,
            selector: Cow::Owned(selector.into()),
        }
    }

    /// Match by `id` attribute
    #[must_use]
    pub const fn id(id: &'static str) -> Self {
        Self::new(By::Id, id)
    }

    /// Match by `name` attribute
    #[must_use]
    pub const fn name(name: &'static str) -> Self {
        Self::new(By::Name, name)
    }

    /// Match by XPath expression
    #[must_use]
    pub const fn xpath(expr: &'static str) -> Self {
        Self::new(By::XPath, expr)
    }

    /// Match by CSS selector
    #[must_use]
    pub const fn css(selector: &'static str) -> Self {
        Self::new(By::Css, selector)
    }

    /// Match anchors by exact visible text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::owned(By::LinkText, text)
    }

    /// Get the strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Get the selector
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Lower this locator to a query a backend can evaluate.
    ///
    /// CSS stays CSS; every other strategy becomes XPath with its selector
    /// quoted through [`xpath_literal`].
    #[must_use]
    pub fn to_query(&self) -> Query {
        let s = self.selector();
        match self.by {
            By::Css => Query::Css(s.to_string()),
            By::XPath => Query::XPath(s.to_string()),
            By::Id => Query::XPath(format!("//*[@id={}]", xpath_literal(s))),
            By::Name => Query::XPath(format!("//*[@name={}]", xpath_literal(s))),
            By::LinkText => Query::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(s))),
            By::PartialLinkText => Query::XPath(format!("//a[contains(., {})]", xpath_literal(s))),
            By::TagName => Query::XPath(format!("//*[local-name()={}]", xpath_literal(s))),
            By::ClassName => Query::XPath(format!(
                "//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
                xpath_literal(&format!(" {s} "))
            )),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by, self.selector)
    }
}

/// Quote arbitrary text as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds is
/// emitted as a `concat(...)` of pieces.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
