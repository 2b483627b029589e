//! TUI type definitions for screens and actions.

use crate::types::{EpisodeId, ShowId};

/// Which list has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The show selector
    ShowList,
    /// The active show's episodes
    EpisodeList,
}

/// Actions that can be returned from the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Choose a show, or the "no show" option
    SelectShow(Option<ShowId>),
    /// Pin an episode, or the "no episode" option
    SelectEpisode(Option<EpisodeId>),
    /// Replace the show search text
    ShowQuery(String),
    /// Replace the episode search text
    EpisodeQuery(String),
    /// Clear episode search text and pin
    ShowAll,
    /// Retry the failed fetch
    Retry,
}
