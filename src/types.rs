//! Type definitions for the tvmaze-browser application.
//!
//! This module contains the data structures for shows and episodes, both in
//! the raw shape returned by the TVMaze API and in the normalized shape the
//! rest of the application works with.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Identifier of a show in the TVMaze catalog.
pub type ShowId = u64;

/// Identifier of an episode in the TVMaze catalog.
pub type EpisodeId = u64;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip HTML markup from a summary and collapse whitespace.
///
/// TVMaze summaries are small HTML fragments (`<p>`, `<b>`, `<i>`). Tags are
/// replaced by spaces so that adjacent paragraphs don't run together, and the
/// handful of entities TVMaze emits are decoded.
///
/// # Examples
///
/// ```
/// use tvmaze_browser::types::strip_markup;
///
/// assert_eq!(
///     strip_markup("<p>A <b>chemistry</b> teacher &amp; his partner.</p>"),
///     "A chemistry teacher & his partner."
/// );
/// assert_eq!(strip_markup(""), "");
/// ```
pub fn strip_markup(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Format a number with at least two digits, as used in episode codes.
pub fn pad(num: u32) -> String {
    format!("{:02}", num)
}

#[derive(Debug, Default, Deserialize)]
struct RawRating {
    #[serde(default)]
    average: Option<f64>,
}

/// Raw show data as returned from `GET /shows`.
///
/// Every field other than `id` and `name` may be absent or null; conversion
/// into [`Show`] normalizes them.
#[derive(Debug, Deserialize)]
pub struct RawShow {
    pub id: ShowId,
    pub name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    premiered: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Raw episode data as returned from `GET /shows/{id}/episodes`.
#[derive(Debug, Deserialize)]
pub struct RawEpisode {
    pub id: EpisodeId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    season: Option<u32>,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    airdate: Option<String>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    rating: Option<RawRating>,
    #[serde(default)]
    url: Option<String>,
}

/// A show in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    pub genres: Vec<String>,
    /// Summary with markup stripped; empty when TVMaze has none.
    pub summary: String,
    pub premiered: String,
    pub url: String,
}

impl From<RawShow> for Show {
    fn from(raw: RawShow) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            genres: raw.genres,
            summary: raw.summary.as_deref().map(strip_markup).unwrap_or_default(),
            premiered: raw.premiered.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}

impl Show {
    /// Create a show with only an id and a name, everything else empty.
    pub fn new(id: ShowId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            genres: Vec::new(),
            summary: String::new(),
            premiered: String::new(),
            url: String::new(),
        }
    }

    /// Format the show for display in selection menus.
    ///
    /// # Examples
    ///
    /// ```
    /// use tvmaze_browser::types::Show;
    ///
    /// let mut show = Show::new(169, "Breaking Bad");
    /// assert_eq!(show.to_display(), "Breaking Bad");
    ///
    /// show.premiered = "2008-01-20".to_string();
    /// assert_eq!(show.to_display(), "Breaking Bad (2008)");
    /// ```
    pub fn to_display(&self) -> String {
        match self.premiered.get(..4) {
            Some(year) => format!("{} ({})", self.name, year),
            None => self.name.clone(),
        }
    }

    /// Genres joined into a single line.
    pub fn genre_line(&self) -> String {
        self.genres.join(", ")
    }
}

/// An episode of a show.
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    pub id: EpisodeId,
    pub show_id: ShowId,
    pub season: u32,
    /// Episode number within the season; 0 for unnumbered specials.
    pub number: u32,
    pub name: String,
    /// Summary with markup stripped; empty when TVMaze has none.
    pub summary: String,
    pub airdate: String,
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub url: String,
}

impl Episode {
    /// Normalize a raw episode fetched for `show_id`.
    pub fn from_raw(show_id: ShowId, raw: RawEpisode) -> Self {
        Self {
            id: raw.id,
            show_id,
            season: raw.season.unwrap_or(0),
            number: raw.number.unwrap_or(0),
            name: raw.name.unwrap_or_default(),
            summary: raw.summary.as_deref().map(strip_markup).unwrap_or_default(),
            airdate: raw.airdate.unwrap_or_default(),
            runtime: raw.runtime,
            rating: raw.rating.and_then(|r| r.average),
            url: raw.url.unwrap_or_default(),
        }
    }

    /// Create an episode with only the identifying fields set.
    pub fn new(id: EpisodeId, show_id: ShowId, season: u32, number: u32, name: &str) -> Self {
        Self {
            id,
            show_id,
            season,
            number,
            name: name.to_string(),
            summary: String::new(),
            airdate: String::new(),
            runtime: None,
            rating: None,
            url: String::new(),
        }
    }

    /// Season/episode code such as `S01E05`.
    pub fn code(&self) -> String {
        format!("S{}E{}", pad(self.season), pad(self.number))
    }

    /// Format the episode for display in selection menus.
    ///
    /// # Examples
    ///
    /// ```
    /// use tvmaze_browser::types::Episode;
    ///
    /// let ep = Episode::new(1, 82, 1, 1, "Winter Is Coming");
    /// assert_eq!(ep.to_display(), "S01E01 - Winter Is Coming");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{} - {}", self.code(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_paragraphs() {
        let html = "<p>First.</p><p>Second &quot;quoted&quot;.</p>";
        assert_eq!(strip_markup(html), "First. Second \"quoted\".");
    }

    #[test]
    fn test_strip_markup_plain_text_unchanged() {
        assert_eq!(strip_markup("No markup here"), "No markup here");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad(1), "01");
        assert_eq!(pad(12), "12");
        assert_eq!(pad(123), "123");
    }

    #[test]
    fn test_raw_show_full() {
        let json = r#"{
            "id": 169,
            "url": "https://www.tvmaze.com/shows/169/breaking-bad",
            "name": "Breaking Bad",
            "genres": ["Drama", "Crime", "Thriller"],
            "language": "English",
            "premiered": "2008-01-20",
            "rating": {"average": 9.2},
            "image": {"medium": "https://static.tvmaze.com/m.jpg", "original": "https://static.tvmaze.com/o.jpg"},
            "summary": "<p><b>Breaking Bad</b> follows Walter White.</p>"
        }"#;

        let show: Show = serde_json::from_str::<RawShow>(json).unwrap().into();
        assert_eq!(show.id, 169);
        assert_eq!(show.genre_line(), "Drama, Crime, Thriller");
        assert_eq!(show.summary, "Breaking Bad follows Walter White.");
        assert_eq!(show.url, "https://www.tvmaze.com/shows/169/breaking-bad");
        assert_eq!(show.to_display(), "Breaking Bad (2008)");
    }

    #[test]
    fn test_raw_show_missing_fields_normalized() {
        let json = r#"{"id": 7, "name": "Obscure", "summary": null, "image": null, "rating": {"average": null}}"#;

        let show: Show = serde_json::from_str::<RawShow>(json).unwrap().into();
        assert_eq!(show.summary, "");
        assert_eq!(show.url, "");
        assert!(show.genres.is_empty());
        assert_eq!(show.to_display(), "Obscure");
    }

    #[test]
    fn test_raw_episode_normalized() {
        let json = r#"{
            "id": 4952,
            "url": "https://www.tvmaze.com/episodes/4952/game-of-thrones-1x01-winter-is-coming",
            "name": "Winter is Coming",
            "season": 1,
            "number": 1,
            "airdate": "2011-04-17",
            "runtime": 60,
            "rating": {"average": 8.1},
            "image": null,
            "summary": "<p>Lord Eddard Stark is torn.</p>"
        }"#;

        let ep = Episode::from_raw(82, serde_json::from_str(json).unwrap());
        assert_eq!(ep.show_id, 82);
        assert_eq!((ep.season, ep.number), (1, 1));
        assert_eq!(ep.code(), "S01E01");
        assert_eq!(ep.summary, "Lord Eddard Stark is torn.");
        assert_eq!(ep.runtime, Some(60));
        assert_eq!(ep.rating, Some(8.1));
    }

    #[test]
    fn test_raw_episode_special_without_number() {
        let json = r#"{"id": 99, "name": "Special", "season": 2, "number": null}"#;

        let ep = Episode::from_raw(1, serde_json::from_str(json).unwrap());
        assert_eq!(ep.number, 0);
        assert_eq!(ep.to_display(), "S02E00 - Special");
        assert_eq!(ep.airdate, "");
    }
}
