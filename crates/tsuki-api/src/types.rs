use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CatalogError;
use crate::traits::{AiringEntry, AiringFeedPage, DownloadLink, Episode, SearchHit, SeriesPage};

// ── Catalog response types ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub session: String,
    pub img: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub year: Option<u32>,
    pub score: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesResponse {
    pub title: Option<String>,
    pub total: Option<u32>,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub episodes: Option<Vec<Value>>,
    pub synopsis: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodeItem {
    #[serde(deserialize_with = "string_or_number")]
    pub episode: String,
    pub session: String,
    #[serde(default)]
    pub snapshot: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkItem {
    pub link: String,
    #[serde(default)]
    pub name: String,
}

/// Primary airing feed page.
#[derive(Debug, Deserialize)]
pub struct AiringResponse {
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub data: Option<Vec<Value>>,
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AiringItem {
    pub id: u64,
    pub anime_id: u64,
    pub anime_title: String,
    pub anime_session: String,
    #[serde(deserialize_with = "u32_lenient")]
    pub episode: u32,
    #[serde(default)]
    pub snapshot: String,
    #[serde(default)]
    pub created_at: String,
    pub fansub: Option<String>,
}

/// Airing schedule from the fallback source: a raw paginator envelope that
/// may omit `current_page` and `total` and carries `per_page` instead.
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    pub total: Option<u32>,
    pub per_page: Option<u32>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub data: Option<Vec<Value>>,
}

// ── Conversions ──────────────────────────────────────────────────

/// Decode each element on its own so one malformed record drops only itself.
fn decode_items<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed catalog record");
                None
            }
        })
        .collect()
}

impl SearchResponse {
    pub fn into_hits(self) -> Vec<SearchHit> {
        decode_items::<SearchItem>(self.data.unwrap_or_default())
            .into_iter()
            .map(SearchItem::into_hit)
            .collect()
    }
}

impl SearchItem {
    pub fn into_hit(self) -> SearchHit {
        SearchHit {
            id: self.id,
            title: self.title,
            poster: self.img.or(self.poster).unwrap_or_default(),
            session: self.session,
            kind: self.kind,
            episodes: self.episodes,
            status: self.status,
            season: self.season,
            year: self.year,
            score: self.score,
        }
    }
}

impl SeriesResponse {
    /// Normalize into a [`SeriesPage`]. `requested` fills in a missing `page`.
    pub fn into_series_page(self, requested: u32) -> Result<SeriesPage, CatalogError> {
        let episodes: Vec<Episode> = decode_items::<EpisodeItem>(
            self.episodes.ok_or(CatalogError::Shape("episodes"))?,
        )
        .into_iter()
        .map(|e| Episode {
            episode: e.episode,
            session: e.session,
            snapshot: e.snapshot,
        })
        .collect();

        let page = self.page.unwrap_or(requested);
        let count = u32::try_from(episodes.len()).unwrap_or(u32::MAX);
        Ok(SeriesPage {
            title: self.title.unwrap_or_default(),
            total: self.total.unwrap_or(count),
            page,
            total_pages: self.total_pages.unwrap_or(page),
            episodes,
            synopsis: self.synopsis,
            img: self.img,
        })
    }
}

/// Episode link payloads are a bare array; anything else means "no links".
pub fn links_from_value(body: Value) -> Vec<DownloadLink> {
    match body {
        Value::Array(items) => decode_items::<LinkItem>(items)
            .into_iter()
            .map(|l| DownloadLink {
                link: l.link,
                name: l.name,
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl AiringItem {
    pub fn into_entry(self) -> AiringEntry {
        AiringEntry {
            id: self.id,
            anime_id: self.anime_id,
            anime_title: self.anime_title,
            anime_session: self.anime_session,
            episode: self.episode,
            snapshot: self.snapshot,
            created_at: self.created_at,
            fansub: self.fansub.filter(|f| !f.trim().is_empty()),
        }
    }
}

fn airing_entries(items: Vec<Value>) -> Vec<AiringEntry> {
    decode_items::<AiringItem>(items)
        .into_iter()
        .map(AiringItem::into_entry)
        .collect()
}

fn count(entries: &[AiringEntry]) -> u32 {
    u32::try_from(entries.len()).unwrap_or(u32::MAX)
}

impl AiringResponse {
    pub fn into_feed_page(self, requested: u32) -> Result<AiringFeedPage, CatalogError> {
        let data = airing_entries(self.data.ok_or(CatalogError::Shape("data"))?);
        let current_page = self.current_page.unwrap_or(requested);
        Ok(AiringFeedPage {
            current_page,
            last_page: self.last_page.unwrap_or(current_page),
            total: self.total.unwrap_or_else(|| count(&data)),
            data,
        })
    }
}

impl ScheduleResponse {
    /// Remap the schedule envelope into the primary feed shape.
    pub fn into_feed_page(self, requested: u32) -> Result<AiringFeedPage, CatalogError> {
        let data = airing_entries(self.data.ok_or(CatalogError::Shape("data"))?);
        let current_page = self.current_page.unwrap_or(requested);
        let last_page = match (self.last_page, self.total, self.per_page) {
            (Some(last), _, _) => last,
            (None, Some(total), Some(per_page)) if per_page > 0 => {
                total.div_ceil(per_page).max(1)
            }
            _ => current_page,
        };
        Ok(AiringFeedPage {
            current_page,
            last_page,
            total: self.total.unwrap_or_else(|| count(&data)),
            data,
        })
    }
}

// ── Lenient scalars ──────────────────────────────────────────────

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn u32_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let parsed = match Value::deserialize(de)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom("expected a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_response() {
        let json = r#"{
            "total": 2,
            "data": [
                {
                    "id": 5367,
                    "title": "Sousou no Frieren",
                    "type": "TV",
                    "episodes": 28,
                    "status": "Finished Airing",
                    "season": "Fall",
                    "year": 2023,
                    "score": 9.3,
                    "img": "https://i.animepahe.ru/posters/frieren.jpg",
                    "session": "c2a5c7d3-frieren"
                },
                {
                    "id": 1,
                    "title": "Broken entry without session"
                }
            ]
        }"#;

        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let hits = resp.into_hits();
        assert_eq!(hits.len(), 1);

        let hit = &hits[0];
        assert_eq!(hit.id, 5367);
        assert_eq!(hit.poster, "https://i.animepahe.ru/posters/frieren.jpg");
        assert_eq!(hit.kind.as_deref(), Some("TV"));
        assert_eq!(hit.episodes, Some(28));
        assert_eq!(hit.year, Some(2023));
    }

    #[test]
    fn test_search_poster_falls_back_to_poster_field() {
        let json = r#"{"data": [{"title": "X", "session": "s", "poster": "p.jpg"}]}"#;
        let hits = serde_json::from_str::<SearchResponse>(json)
            .unwrap()
            .into_hits();
        assert_eq!(hits[0].poster, "p.jpg");
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn test_search_without_data_is_empty() {
        let resp: SearchResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(resp.into_hits().is_empty());
    }

    #[test]
    fn test_deserialize_series_response() {
        let json = r#"{
            "title": "One Piece",
            "total": 1100,
            "page": 2,
            "total_pages": 37,
            "next": true,
            "synopsis": "Gol D. Roger...",
            "img": "https://i/onepiece.jpg",
            "episodes": [
                {"episode": 31, "session": "ep31", "snapshot": "s31.jpg"},
                {"episode": "32", "session": "ep32", "snapshot": "s32.jpg"},
                {"episode": 32.5, "session": "ep32b"}
            ]
        }"#;

        let resp: SeriesResponse = serde_json::from_str(json).unwrap();
        let page = resp.into_series_page(2).unwrap();
        assert_eq!(page.total, 1100);
        assert_eq!(page.total_pages, 37);
        assert_eq!(page.episodes.len(), 3);
        assert_eq!(page.episodes[0].episode, "31");
        assert_eq!(page.episodes[1].episode, "32");
        assert_eq!(page.episodes[2].episode, "32.5");
        assert_eq!(page.episodes[2].snapshot, "");
        assert_eq!(page.img.as_deref(), Some("https://i/onepiece.jpg"));
    }

    #[test]
    fn test_series_without_episodes_is_shape_error() {
        let resp: SeriesResponse = serde_json::from_str(r#"{"title": "X", "total": 3}"#).unwrap();
        assert!(matches!(
            resp.into_series_page(1),
            Err(CatalogError::Shape("episodes"))
        ));
    }

    #[test]
    fn test_links_from_array_and_non_array() {
        let body = serde_json::json!([
            {"link": "https://kwik/a", "name": "SubsPlease · 1080p"},
            {"link": "https://kwik/b"},
            {"name": "no link"}
        ]);
        let links = links_from_value(body);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "SubsPlease · 1080p");
        assert_eq!(links[1].name, "");

        assert!(links_from_value(serde_json::json!({"error": "nope"})).is_empty());
    }

    #[test]
    fn test_deserialize_airing_response() {
        let json = r#"{
            "total": 3,
            "per_page": 12,
            "current_page": 1,
            "last_page": 1,
            "from": 1,
            "to": 3,
            "data": [
                {
                    "id": 60001,
                    "anime_id": 5367,
                    "anime_title": "Sousou no Frieren",
                    "anime_session": "c2a5c7d3-frieren",
                    "episode": 14,
                    "fansub": "SubsPlease",
                    "snapshot": "https://i/snap.jpg",
                    "created_at": "2024-01-15 10:00:00"
                },
                {
                    "id": 60002,
                    "anime_id": 12,
                    "anime_title": "Dungeon Meshi",
                    "anime_session": "dm",
                    "episode": "3",
                    "fansub": "",
                    "snapshot": "https://i/dm.jpg",
                    "created_at": "2024-01-15 09:00:00"
                }
            ]
        }"#;

        let resp: AiringResponse = serde_json::from_str(json).unwrap();
        let page = resp.into_feed_page(1).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].fansub.as_deref(), Some("SubsPlease"));
        assert_eq!(page.data[1].episode, 3);
        assert!(page.data[1].fansub.is_none());
    }

    #[test]
    fn test_airing_without_data_is_shape_error() {
        let resp: AiringResponse =
            serde_json::from_str(r#"{"message": "rate limited"}"#).unwrap();
        assert!(matches!(resp.into_feed_page(1), Err(CatalogError::Shape("data"))));
    }

    #[test]
    fn test_schedule_remaps_missing_fields() {
        let json = r#"{
            "total": 50,
            "per_page": 12,
            "next_page_url": "https://animepahe.si/api?m=airing&page=3",
            "data": [
                {
                    "id": 1,
                    "anime_id": 2,
                    "anime_title": "Kusuriya no Hitorigoto",
                    "anime_session": "kh",
                    "episode": 20,
                    "episode2": 0,
                    "edition": "",
                    "snapshot": "https://i/kh.jpg",
                    "disc": "",
                    "session": "episode-session",
                    "filler": 0,
                    "created_at": "2024-03-09T16:00:00+00:00",
                    "completed": 1
                }
            ]
        }"#;

        let resp: ScheduleResponse = serde_json::from_str(json).unwrap();
        let page = resp.into_feed_page(2).unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.last_page, 5);
        assert_eq!(page.total, 50);
        assert_eq!(page.data[0].anime_title, "Kusuriya no Hitorigoto");
        assert_eq!(page.data[0].episode, 20);
    }

    #[test]
    fn test_schedule_keeps_explicit_last_page() {
        let json = r#"{"current_page": 2, "last_page": 5, "data": []}"#;
        let page = serde_json::from_str::<ScheduleResponse>(json)
            .unwrap()
            .into_feed_page(2)
            .unwrap();
        assert_eq!(page.last_page, 5);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_schedule_last_page_below_requested_page_is_kept() {
        let json = r#"{"current_page": 7, "last_page": 5, "data": []}"#;
        let page = serde_json::from_str::<ScheduleResponse>(json)
            .unwrap()
            .into_feed_page(7)
            .unwrap();
        assert_eq!(page.current_page, 7);
        assert_eq!(page.last_page, 5);
    }

    #[test]
    fn test_schedule_derived_last_page_has_a_floor_of_one() {
        let json = r#"{"total": 0, "per_page": 12, "data": []}"#;
        let page = serde_json::from_str::<ScheduleResponse>(json)
            .unwrap()
            .into_feed_page(1)
            .unwrap();
        assert_eq!(page.last_page, 1);
    }
}
