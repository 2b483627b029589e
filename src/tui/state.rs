//! Application state management and input handling.
//!
//! The TUI holds no copy of the browse state: queries, pins and lists are
//! read from the [`NavigationCoordinator`] on every key press and every
//! frame, so the search bar and the lists cannot drift apart.

use crate::browse::{CatalogStatus, DataSource, Lifecycle, NavigationCoordinator};
use crate::config::{Config, Keybindings};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Screen};

/// Application state for the TUI.
pub struct App {
    /// Which list has focus
    pub screen: Screen,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Whether search bar is focused
    pub search_focused: bool,
    /// List state for shows
    pub show_list_state: ListState,
    /// List state for episodes
    pub episode_list_state: ListState,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Show ratings in the details panel
    pub show_ratings: bool,
    /// Show airdates in lists and details
    pub show_airdates: bool,
    /// Custom keybindings
    pub keybindings: Keybindings,
}

impl App {
    /// Create a new App with settings from the config.
    pub fn new(config: &Config) -> Self {
        Self {
            screen: Screen::ShowList,
            should_quit: false,
            search_focused: false,
            show_list_state: ListState::default(),
            episode_list_state: ListState::default(),
            show_help: false,
            show_ratings: config.show_ratings,
            show_airdates: config.show_airdates,
            keybindings: config.keybindings.clone(),
        }
    }

    /// Keep list highlights inside the current lists.
    ///
    /// Called after every state change, since filtering and pinning change
    /// list lengths underneath the highlight.
    pub fn sync<S: DataSource>(&mut self, nav: &NavigationCoordinator<S>) {
        clamp(&mut self.show_list_state, nav.catalog_view().len());
        clamp(&mut self.episode_list_state, nav.display_episodes().len());
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input<S: DataSource>(
        &mut self,
        key: KeyEvent,
        nav: &NavigationCoordinator<S>,
    ) -> Action {
        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Action::Quit;
        }

        // Handle help modal
        if self.show_help {
            if key.code == KeyCode::Esc
                || self.keybindings.matches(&self.keybindings.help, &key)
                || self.keybindings.matches(&self.keybindings.quit, &key)
            {
                self.show_help = false;
            }
            return Action::None;
        }

        // Handle search bar input when focused
        if self.search_focused {
            return self.handle_search_bar_input(key, nav);
        }

        if self.keybindings.matches(&self.keybindings.help, &key) {
            self.show_help = true;
            return Action::None;
        }

        if self.keybindings.matches(&self.keybindings.quit, &key) {
            self.should_quit = true;
            return Action::Quit;
        }

        if self.keybindings.matches(&self.keybindings.search, &key)
            || self.keybindings.matches(&self.keybindings.filter, &key)
        {
            if self.screen == Screen::EpisodeList && !matches!(nav.lifecycle(), Lifecycle::Browsing(_)) {
                return Action::None;
            }
            self.search_focused = true;
            return Action::None;
        }

        if self
            .keybindings
            .matches(&self.keybindings.toggle_focus, &key)
        {
            self.screen = match self.screen {
                Screen::ShowList => Screen::EpisodeList,
                Screen::EpisodeList => Screen::ShowList,
            };
            return Action::None;
        }

        if self.keybindings.matches(&self.keybindings.retry, &key) {
            let failed = matches!(nav.catalog_status(), CatalogStatus::Failed(_))
                || matches!(nav.lifecycle(), Lifecycle::Error { .. });
            return if failed { Action::Retry } else { Action::None };
        }

        match self.screen {
            Screen::ShowList => self.handle_show_list_input(key, nav),
            Screen::EpisodeList => self.handle_episode_list_input(key, nav),
        }
    }

    fn handle_search_bar_input<S: DataSource>(
        &mut self,
        key: KeyEvent,
        nav: &NavigationCoordinator<S>,
    ) -> Action {
        let current = match self.screen {
            Screen::ShowList => nav.show_query(),
            Screen::EpisodeList => nav.episode_query(),
        };

        let updated = match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.search_focused = false;
                return Action::None;
            }
            KeyCode::Char(c) => {
                let mut text = current.to_string();
                text.push(c);
                text
            }
            KeyCode::Backspace => {
                let mut text = current.to_string();
                text.pop();
                text
            }
            _ => return Action::None,
        };

        // Filtering restarts from the top of the list.
        match self.screen {
            Screen::ShowList => {
                self.show_list_state.select(Some(0));
                Action::ShowQuery(updated)
            }
            Screen::EpisodeList => {
                self.episode_list_state.select(Some(0));
                Action::EpisodeQuery(updated)
            }
        }
    }

    fn handle_show_list_input<S: DataSource>(
        &mut self,
        key: KeyEvent,
        nav: &NavigationCoordinator<S>,
    ) -> Action {
        let shows = nav.catalog_view();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            move_up(&mut self.show_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            move_down(&mut self.show_list_state, shows.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            match self.show_list_state.selected().and_then(|i| shows.get(i)) {
                Some(show) => {
                    self.screen = Screen::EpisodeList;
                    self.episode_list_state.select(Some(0));
                    Action::SelectShow(Some(show.id))
                }
                None => Action::None,
            }
        } else if self
            .keybindings
            .matches(&self.keybindings.clear_selection, &key)
        {
            Action::SelectShow(None)
        } else {
            Action::None
        }
    }

    fn handle_episode_list_input<S: DataSource>(
        &mut self,
        key: KeyEvent,
        nav: &NavigationCoordinator<S>,
    ) -> Action {
        if self.keybindings.matches(&self.keybindings.back, &key) {
            self.screen = Screen::ShowList;
            return Action::None;
        }

        if !matches!(nav.lifecycle(), Lifecycle::Browsing(_)) {
            return Action::None;
        }

        let episodes = nav.display_episodes();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            move_up(&mut self.episode_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            move_down(&mut self.episode_list_state, episodes.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            match self.episode_list_state.selected().and_then(|i| episodes.get(i)) {
                Some(episode) => {
                    self.episode_list_state.select(Some(0));
                    Action::SelectEpisode(Some(episode.id))
                }
                None => Action::None,
            }
        } else if self
            .keybindings
            .matches(&self.keybindings.clear_selection, &key)
        {
            Action::SelectEpisode(None)
        } else if self.keybindings.matches(&self.keybindings.show_all, &key) {
            self.episode_list_state.select(Some(0));
            Action::ShowAll
        } else {
            Action::None
        }
    }
}

fn move_up(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    if i > 0 {
        state.select(Some(i - 1));
    }
}

fn move_down(state: &mut ListState, len: usize) {
    let i = state.selected().unwrap_or(0);
    if i < len.saturating_sub(1) {
        state.select(Some(i + 1));
    }
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        None => state.select(Some(0)),
        Some(i) if i >= len => state.select(Some(len - 1)),
        Some(_) => {}
    }
}
