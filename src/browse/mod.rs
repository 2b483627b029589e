//! Catalog browsing core: caching, filtering, selection and navigation.
//!
//! Nothing in here knows about the terminal; the TUI and the headless
//! printer both drive a [`NavigationCoordinator`] and render its output.

mod cache;
mod coordinator;
mod filter;
mod selection;
mod source;

pub use cache::{CatalogKey, Collection, CollectionCache};
pub use coordinator::{
    count_label, BrowseState, CatalogStatus, FetchOutcome, Lifecycle, NavigationCoordinator,
    StateChange, EPISODES_ERROR_MESSAGE, IDLE_LABEL, SHOWS_ERROR_MESSAGE,
};
pub use filter::{filter, matches, normalize_query, Searchable};
pub use selection::{Keyed, SelectionState};
pub use source::DataSource;
