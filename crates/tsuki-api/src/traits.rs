//! Catalog records and the trait the navigation engine talks to.
//!
//! `CatalogClient` implements [`Catalog`] over HTTP; the core crate only
//! depends on the trait, so its components can be driven by any source.

use std::future::Future;

use chrono::{DateTime, Datelike, NaiveDateTime};

/// Read access to the remote anime catalog.
///
/// Every operation degrades instead of failing: transport errors, bad status
/// codes and malformed payloads surface as an empty `Vec` or `None`.
pub trait Catalog: Send + Sync {
    /// Search series by title. Failure and "no matches" are both `[]`.
    fn search(&self, query: &str) -> impl Future<Output = Vec<SearchHit>> + Send;

    /// Fetch one page of a series' episode list.
    fn series_page(
        &self,
        session: &str,
        page: u32,
    ) -> impl Future<Output = Option<SeriesPage>> + Send;

    /// Fetch the flat, unlabeled link list for one episode.
    fn episode_links(
        &self,
        session: &str,
        episode_session: &str,
    ) -> impl Future<Output = Option<Vec<DownloadLink>>> + Send;

    /// Fetch one page of the airing feed, falling back to the secondary source.
    fn airing_page(&self, page: u32) -> impl Future<Output = Option<AiringFeedPage>> + Send;
}

/// A search result. `session` keys every later series/episode call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    pub poster: String,
    pub session: String,
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub year: Option<u32>,
    pub score: Option<f32>,
}

/// One page of a series' episode list.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeriesPage {
    pub title: String,
    pub total: u32,
    pub page: u32,
    pub total_pages: u32,
    pub episodes: Vec<Episode>,
    pub synopsis: Option<String>,
    pub img: Option<String>,
}

impl SeriesPage {
    /// Whether more pages follow this one. Only such pages are known to be full.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// First episode whose number equals `number`. Duplicates: first wins.
    pub fn find_episode(&self, number: u32) -> Option<&Episode> {
        self.episodes.iter().find(|ep| ep.matches_number(number))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Episode {
    /// Episode number as sent upstream ("12", "12.5").
    pub episode: String,
    pub session: String,
    pub snapshot: String,
}

impl Episode {
    /// Compare the textual episode number against an integer target.
    pub fn matches_number(&self, number: u32) -> bool {
        let text = self.episode.trim();
        if text == number.to_string() {
            return true;
        }
        text.parse::<f64>()
            .map(|n| n == f64::from(number))
            .unwrap_or(false)
    }
}

/// A download or stream target. Upstream gives no audio-track label.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DownloadLink {
    pub link: String,
    pub name: String,
}

impl DownloadLink {
    /// Label to show for the link at `index` within its group.
    pub fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("Server {}", index + 1)
        } else {
            self.name.clone()
        }
    }
}

/// A freshly released episode in the airing feed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AiringEntry {
    pub id: u64,
    pub anime_id: u64,
    pub anime_title: String,
    pub anime_session: String,
    pub episode: u32,
    pub snapshot: String,
    pub created_at: String,
    pub fansub: Option<String>,
}

impl AiringEntry {
    /// Build the search-hit handoff used to open the series view.
    ///
    /// `episodes` carries the latest aired episode, not the series length.
    pub fn to_search_hit(&self) -> SearchHit {
        SearchHit {
            id: self.anime_id,
            title: self.anime_title.clone(),
            poster: self.snapshot.clone(),
            session: self.anime_session.clone(),
            kind: None,
            episodes: Some(self.episode),
            status: Some("Airing".into()),
            season: None,
            year: parse_year(&self.created_at),
            score: None,
        }
    }
}

/// Normalized airing feed page. Both airing sources produce this shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AiringFeedPage {
    pub current_page: u32,
    pub last_page: u32,
    pub data: Vec<AiringEntry>,
    pub total: u32,
}

fn parse_year(timestamp: &str) -> Option<u32> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return u32::try_from(dt.year()).ok();
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .and_then(|dt| u32::try_from(dt.year()).ok())
}
