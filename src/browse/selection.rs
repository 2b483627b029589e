//! Pinned-item selection and its interplay with the search text.
//!
//! A list can be narrowed two ways: by typing a query, or by picking a single
//! item from the selector. The two are mutually exclusive views of the same
//! list, so each one resets the other.

use super::filter::{filter, Searchable};
use crate::types::{Episode, EpisodeId, Show, ShowId};
use log::debug;
use std::fmt::Debug;

/// An item with a stable identifier that a selection can refer to.
pub trait Keyed {
    type Key: Copy + Eq + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Show {
    type Key = ShowId;

    fn key(&self) -> ShowId {
        self.id
    }
}

impl Keyed for Episode {
    type Key = EpisodeId;

    fn key(&self) -> EpisodeId {
        self.id
    }
}

/// Search text and pinned item for one list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState<K> {
    query: String,
    pinned: Option<K>,
}

impl<K> Default for SelectionState<K> {
    fn default() -> Self {
        Self {
            query: String::new(),
            pinned: None,
        }
    }
}

impl<K: Copy + Eq + Debug> SelectionState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search text, exactly as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pinned(&self) -> Option<K> {
        self.pinned
    }

    /// Pin a single item. The query is cleared.
    pub fn select(&mut self, key: K) {
        self.pinned = Some(key);
        self.query.clear();
    }

    /// Replace the search text. Any pin is cleared.
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.pinned = None;
    }

    /// Unpin, keeping the query. Equivalent to picking the "none" option.
    pub fn clear(&mut self) {
        self.pinned = None;
    }

    /// Clear both the pin and the query.
    pub fn reset(&mut self) {
        self.pinned = None;
        self.query.clear();
    }

    /// Find the pinned item in `items`.
    ///
    /// A pin that refers to an item not in `items` resolves to `None`.
    pub fn resolve<'a, T: Keyed<Key = K>>(&self, items: &'a [T]) -> Option<&'a T> {
        let key = self.pinned?;
        let found = items.iter().find(|item| item.key() == key);
        if found.is_none() {
            debug!("Pinned item {:?} is not in the current list, ignoring", key);
        }
        found
    }

    /// The items to display: the pinned item alone, or the filtered list.
    pub fn view<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: Keyed<Key = K> + Searchable,
    {
        match self.resolve(items) {
            Some(item) => vec![item],
            None => filter(items, &self.query),
        }
    }
}
