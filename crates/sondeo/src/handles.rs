//! Handle registry for remote backends.
//!
//! A backend that holds live node objects keeps them here and hands out
//! `"{generation}:{id}"` handles. Invalidating bumps the generation and drops
//! every stored node, so handles issued before it resolve to nothing.

use crate::session::ElementHandle;
use std::collections::HashMap;

/// Protocol messages that mean "the search matched nothing"
const NO_MATCH_MESSAGES: &[&str] = &[
    "Could not find node with given id",
    "No node with given id found",
    "No search session with given id found",
    "No node found",
];

/// Whether a backend lookup error only reports an empty match
#[must_use]
pub fn is_no_match(message: &str) -> bool {
    NO_MATCH_MESSAGES.iter().any(|m| message.contains(m))
}

/// Split a `"{generation}:{id}"` handle
fn parse_handle(handle: &ElementHandle) -> Option<(u64, u64)> {
    let (generation, id) = handle.id().split_once(':')?;
    Some((generation.parse().ok()?, id.parse().ok()?))
}

/// Nodes of the current page, keyed by handle
#[derive(Debug)]
pub struct Registry<T> {
    generation: u64,
    next_id: u64,
    entries: HashMap<(u64, u64), T>,
    url: Option<String>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            next_id: 0,
            entries: HashMap::new(),
            url: None,
        }
    }
}

impl<T> Registry<T> {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store nodes and issue their handles, in order
    pub fn register(&mut self, nodes: Vec<T>) -> Vec<ElementHandle> {
        let generation = self.generation;
        nodes
            .into_iter()
            .map(|node| {
                let id = self.next_id;
                self.next_id += 1;
                self.entries.insert((generation, id), node);
                ElementHandle::new(format!("{generation}:{id}"))
            })
            .collect()
    }

    /// Node behind a handle of the current generation
    #[must_use]
    pub fn get(&self, handle: &ElementHandle) -> Option<&T> {
        let key = parse_handle(handle)?;
        if key.0 != self.generation {
            return None;
        }
        self.entries.get(&key)
    }

    /// Drop every node; earlier handles go stale
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Record the page address, invalidating when it changed
    pub fn observe_url(&mut self, url: &str) {
        if self.url.as_deref() != Some(url) {
            if self.url.is_some() {
                self.invalidate();
            }
            self.url = Some(url.to_string());
        }
    }

    /// Number of stored nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no node is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
