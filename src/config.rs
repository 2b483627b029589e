//! Configuration file support for tvmaze-browser.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::api::DEFAULT_API_URL;
use crate::error::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the TVMaze API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Show episode ratings in the details panel
    #[serde(default = "default_true")]
    pub show_ratings: bool,

    /// Show episode airdates in lists and the details panel
    #[serde(default = "default_true")]
    pub show_airdates: bool,

    /// Key bindings for the TUI
    #[serde(default)]
    pub keybindings: Keybindings,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            show_ratings: true,
            show_airdates: true,
            keybindings: Keybindings::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/tvmaze-browser/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("tvmaze-browser");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, or defaults if there is no file there.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save config to `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        Self::create_default_at(&path)?;
        Ok(path)
    }

    /// Write the default config to `path` unless a file is already there.
    ///
    /// Returns whether a file was written.
    pub fn create_default_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save_to(path)?;
        Ok(true)
    }
}

/// Key bindings for TUI actions.
///
/// Each binding is a comma-separated list of keys. A key is a single
/// character (`"k"`), a named key (`"up"`, `"enter"`, `"esc"`, `"tab"`,
/// `"backspace"`), optionally prefixed with `ctrl+`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub up: String,
    pub down: String,
    pub select: String,
    pub search: String,
    pub filter: String,
    pub back: String,
    pub clear_selection: String,
    pub show_all: String,
    pub retry: String,
    pub toggle_focus: String,
    pub help: String,
    pub quit: String,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: "k,up".to_string(),
            down: "j,down".to_string(),
            select: "enter".to_string(),
            search: "/".to_string(),
            filter: "f".to_string(),
            back: "backspace,h,left".to_string(),
            clear_selection: "x".to_string(),
            show_all: "a".to_string(),
            retry: "r".to_string(),
            toggle_focus: "tab".to_string(),
            help: "?".to_string(),
            quit: "q".to_string(),
        }
    }
}

impl Keybindings {
    /// Check whether `key` is one of the keys listed in `binding`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    /// use tvmaze_browser::config::Keybindings;
    ///
    /// let keys = Keybindings::default();
    /// let k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
    /// let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
    /// assert!(keys.matches(&keys.up, &k));
    /// assert!(keys.matches(&keys.up, &up));
    /// assert!(!keys.matches(&keys.down, &k));
    /// ```
    pub fn matches(&self, binding: &str, key: &KeyEvent) -> bool {
        binding
            .split(',')
            .filter_map(|spec| parse_key(spec.trim()))
            .any(|(code, mods)| {
                code == key.code
                    && key.modifiers.contains(KeyModifiers::CONTROL) == mods.contains(KeyModifiers::CONTROL)
            })
    }

    /// First key of a binding, for display in hints.
    pub fn label<'a>(&self, binding: &'a str) -> &'a str {
        binding.split(',').next().unwrap_or("").trim()
    }
}

/// Parse a single key spec such as `"ctrl+c"` or `"enter"`.
fn parse_key(spec: &str) -> Option<(KeyCode, KeyModifiers)> {
    let (mods, name) = match spec.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ctrl+") => (KeyModifiers::CONTROL, &spec[5..]),
        _ => (KeyModifiers::NONE, spec),
    };

    let code = match name.to_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        _ => {
            // Single characters keep their case so "G" and "g" differ.
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some((code, mods))
}
