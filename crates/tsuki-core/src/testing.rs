//! In-memory catalog used by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tsuki_api::{
    AiringEntry, AiringFeedPage, Catalog, DownloadLink, Episode, SearchHit, SeriesPage,
};

/// Page `page` of a series of `total` episodes, holding `len` consecutive
/// episodes starting right after the previous pages (assumed `len` long).
pub fn series_page(page: u32, total_pages: u32, total: u32, len: u32) -> SeriesPage {
    let first = (page.saturating_sub(1)) * len + 1;
    SeriesPage {
        title: "Sousou no Frieren".into(),
        total,
        page,
        total_pages,
        episodes: (first..first + len)
            .map(|n| Episode {
                episode: n.to_string(),
                session: format!("ep-{n}"),
                snapshot: format!("https://i/snap-{n}.jpg"),
            })
            .collect(),
        synopsis: None,
        img: None,
    }
}

pub fn links(n: usize) -> Vec<DownloadLink> {
    (0..n)
        .map(|i| DownloadLink {
            link: format!("https://kwik/{i}"),
            name: format!("SubsPlease · {}p", 360 + i * 360),
        })
        .collect()
}

pub fn hit(session: &str) -> SearchHit {
    SearchHit {
        id: 5367,
        title: "Sousou no Frieren".into(),
        poster: "https://i/poster.jpg".into(),
        session: session.into(),
        kind: Some("TV".into()),
        episodes: Some(28),
        status: None,
        season: None,
        year: Some(2023),
        score: None,
    }
}

pub fn airing_page(current_page: u32, last_page: u32, titles: &[&str]) -> AiringFeedPage {
    AiringFeedPage {
        current_page,
        last_page,
        data: titles
            .iter()
            .enumerate()
            .map(|(i, title)| AiringEntry {
                id: i as u64 + 1,
                anime_id: i as u64 + 100,
                anime_title: (*title).into(),
                anime_session: format!("session-{i}"),
                episode: 7,
                snapshot: format!("https://i/airing-{i}.jpg"),
                created_at: "2024-01-15 10:00:00".into(),
                fansub: None,
            })
            .collect(),
        total: titles.len() as u32,
    }
}

/// Canned catalog that counts the requests it receives.
#[derive(Default)]
pub struct FakeCatalog {
    pub hits: Vec<SearchHit>,
    pub series: HashMap<u32, SeriesPage>,
    pub links: HashMap<String, Vec<DownloadLink>>,
    pub airing: HashMap<u32, AiringFeedPage>,
    pub search_calls: AtomicUsize,
    pub series_calls: AtomicUsize,
    pub link_calls: AtomicUsize,
    pub airing_calls: AtomicUsize,
    pub last_query: Mutex<Option<String>>,
}

impl FakeCatalog {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Catalog for FakeCatalog {
    async fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.to_string());
        self.hits.clone()
    }

    async fn series_page(&self, _session: &str, page: u32) -> Option<SeriesPage> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.series.get(&page).cloned()
    }

    async fn episode_links(
        &self,
        _session: &str,
        episode_session: &str,
    ) -> Option<Vec<DownloadLink>> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        self.links.get(episode_session).cloned()
    }

    async fn airing_page(&self, page: u32) -> Option<AiringFeedPage> {
        self.airing_calls.fetch_add(1, Ordering::SeqCst);
        self.airing.get(&page).cloned()
    }
}
