//! API client for the TVMaze catalog.
//!
//! This module implements [`DataSource`] over the public TVMaze REST API:
//! `GET /shows` for the catalog and `GET /shows/{id}/episodes` for a show's
//! episode list.

use crate::browse::DataSource;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{Episode, RawEpisode, RawShow, Show, ShowId};
use log::debug;
use std::time::Duration;

/// Default base URL of the TVMaze API.
pub const DEFAULT_API_URL: &str = "https://api.tvmaze.com";

const USER_AGENT: &str = concat!("tvmaze-browser/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the TVMaze API.
#[derive(Debug, Clone)]
pub struct TvMazeClient {
    client: reqwest::Client,
    base_url: String,
}

impl TvMazeClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tvmaze_browser::api::TvMazeClient;
    ///
    /// let client = TvMazeClient::new("https://api.tvmaze.com/", Duration::from_secs(10)).unwrap();
    /// assert_eq!(client.shows_url(), "https://api.tvmaze.com/shows");
    /// assert_eq!(client.episodes_url(169), "https://api.tvmaze.com/shows/169/episodes");
    /// ```
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the user's configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    pub fn episodes_url(&self, show_id: ShowId) -> String {
        format!("{}/shows/{}/episodes", self.base_url, show_id)
    }

    /// GET `url` and return the body, turning non-success statuses into
    /// transport errors.
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("GET {} returned {}", url, status)));
        }

        Ok(resp.text().await?)
    }
}

/// Decode a `GET /shows` response body.
pub fn parse_shows(body: &str) -> Result<Vec<Show>> {
    let raw: Vec<RawShow> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(Show::from).collect())
}

/// Decode a `GET /shows/{id}/episodes` response body.
pub fn parse_episodes(show_id: ShowId, body: &str) -> Result<Vec<Episode>> {
    let raw: Vec<RawEpisode> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .map(|r| Episode::from_raw(show_id, r))
        .collect())
}

/// A body that doesn't decode is a failed response, not a separate kind of
/// error: fetches only ever fail with [`AppError::Transport`].
fn unreadable_as_transport<T>(url: &str, decoded: Result<T>) -> Result<T> {
    decoded.map_err(|err| match err {
        AppError::Transport(_) => err,
        other => AppError::Transport(format!("GET {} returned an unreadable body: {}", url, other)),
    })
}

impl DataSource for TvMazeClient {
    async fn fetch_catalog(&self) -> Result<Vec<Show>> {
        let url = self.shows_url();
        let body = self.get_text(&url).await?;
        let shows = unreadable_as_transport(&url, parse_shows(&body))?;
        debug!("Fetched {} shows", shows.len());
        Ok(shows)
    }

    async fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>> {
        let url = self.episodes_url(show_id);
        let body = self.get_text(&url).await?;
        let episodes = unreadable_as_transport(&url, parse_episodes(show_id, &body))?;
        debug!("Fetched {} episodes for show {}", episodes.len(), show_id);
        Ok(episodes)
    }
}
