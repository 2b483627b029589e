//! A terminal browser for the TVMaze show catalog written in Rust.
//!
//! tvmaze-browser loads the TVMaze catalog, lets you pick a show, and browses
//! that show's episodes with incremental search and single-episode pinning.
//! Episode lists are fetched once per show and kept for the whole session.
//!
//! # Features
//!
//! - Search the catalog by name, genre, or summary
//! - Browse a show's episodes, filtered as you type
//! - Pin one episode to see its details
//! - Cached episode lists, so returning to a show is instant
//! - Headless `--print` mode for scripting
//!
//! # Usage
//!
//! ```bash
//! # Open the TUI
//! cargo run
//!
//! # Print the episodes of show 169 matching "pilot"
//! cargo run -- --show 169 --episode-query pilot --print
//! ```

pub mod api;
pub mod browse;
pub mod config;
pub mod error;
pub mod tui;
pub mod types;
