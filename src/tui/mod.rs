//! Terminal User Interface for tvmaze-browser using ratatui.
//!
//! This module provides a full-screen TUI with a show list, an episode list
//! for the active show, and a details panel for the highlighted episode.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::{Action, Screen};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
