//! Case-insensitive substring filtering over shows and episodes.

use crate::types::{Episode, Show};
use std::borrow::Cow;

/// An item that can be matched against a search query.
pub trait Searchable {
    /// The text fields a query is matched against. Missing fields are
    /// represented as empty strings.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Show {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Owned(self.genre_line()),
            Cow::Borrowed(self.summary.as_str()),
        ]
    }
}

impl Searchable for Episode {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.summary.as_str()),
        ]
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        (**self).search_fields()
    }
}

/// Normalize a raw query: trim surrounding whitespace and lowercase.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Check whether `item` matches an already-normalized query.
pub fn matches<T: Searchable + ?Sized>(item: &T, normalized: &str) -> bool {
    normalized.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(normalized))
}

/// Return the items matching `query`, in their original order.
///
/// An empty or whitespace-only query is "no filter" and yields every item.
///
/// # Examples
///
/// ```
/// use tvmaze_browser::browse::filter;
/// use tvmaze_browser::types::Show;
///
/// let shows = vec![Show::new(1, "Breaking Bad"), Show::new(2, "Better Call Saul")];
/// let found = filter(&shows, "  BREAK ");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "Breaking Bad");
/// assert_eq!(filter(&shows, "").len(), 2);
/// ```
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let normalized = normalize_query(query);
    items
        .iter()
        .filter(|item| matches(*item, &normalized))
        .collect()
}
