use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::airing::{FallbackAiring, PrimaryAiring, ScheduleAiring};
use crate::error::CatalogError;
use crate::traits::{AiringFeedPage, Catalog, DownloadLink, SearchHit, SeriesPage};
use crate::types::{links_from_value, SearchResponse, SeriesResponse};

pub const DEFAULT_CATALOG_URL: &str = "https://anime.apex-cloud.workers.dev";
pub const DEFAULT_SCHEDULE_URL: &str = "https://animepahe.si/api";
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw";

/// Where the client sends its requests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Catalog worker answering `?method=...` queries.
    pub catalog: String,
    /// Secondary airing schedule API, queried with `m=airing&page=N`.
    pub schedule: String,
    /// Optional passthrough proxy wrapped around the schedule URL.
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG_URL.into(),
            schedule: DEFAULT_SCHEDULE_URL.into(),
            proxy: Some(DEFAULT_PROXY_URL.into()),
            user_agent: concat!("tsuki/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Check the HTTP response for errors and return the body text on failure.
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, CatalogError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status, "catalog API error");
        Err(CatalogError::Api {
            status,
            message: body,
        })
    }
}

/// Issue one GET and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, CatalogError> {
    tracing::debug!(url, ?query, "catalog request");
    let resp = http.get(url).query(query).send().await?;
    let resp = check_response(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

/// HTTP client for the catalog worker.
///
/// No retries and no request deduplication: every call is one request
/// (airing pages may add one fallback request).
pub struct CatalogClient {
    http: Client,
    base_url: String,
    airing: FallbackAiring<PrimaryAiring, ScheduleAiring>,
}

impl CatalogClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .user_agent(endpoints.user_agent.clone())
            .build()?;
        let airing = FallbackAiring::new(
            PrimaryAiring::new(http.clone(), endpoints.catalog.clone()),
            ScheduleAiring::new(http.clone(), endpoints.schedule, endpoints.proxy),
        );
        Ok(Self {
            http,
            base_url: endpoints.catalog,
            airing,
        })
    }

    /// Search by title. A blank query short-circuits without a request.
    pub async fn fetch_search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let body: SearchResponse = get_json(
            &self.http,
            &self.base_url,
            &[("method", "search"), ("query", query)],
        )
        .await?;
        Ok(body.into_hits())
    }

    pub async fn fetch_series(&self, session: &str, page: u32) -> Result<SeriesPage, CatalogError> {
        let page_param = page.to_string();
        let body: SeriesResponse = get_json(
            &self.http,
            &self.base_url,
            &[("method", "series"), ("session", session), ("page", page_param.as_str())],
        )
        .await?;
        body.into_series_page(page)
    }

    pub async fn fetch_episode_links(
        &self,
        session: &str,
        episode_session: &str,
    ) -> Result<Vec<DownloadLink>, CatalogError> {
        let body: serde_json::Value = get_json(
            &self.http,
            &self.base_url,
            &[("method", "episode"), ("session", session), ("ep", episode_session)],
        )
        .await?;
        Ok(links_from_value(body))
    }
}

impl Catalog for CatalogClient {
    async fn search(&self, query: &str) -> Vec<SearchHit> {
        match self.fetch_search(query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, query, "search failed, returning no results");
                Vec::new()
            }
        }
    }

    async fn series_page(&self, session: &str, page: u32) -> Option<SeriesPage> {
        self.fetch_series(session, page)
            .await
            .map_err(|e| tracing::warn!(error = %e, session, page, "series page unavailable"))
            .ok()
    }

    async fn episode_links(
        &self,
        session: &str,
        episode_session: &str,
    ) -> Option<Vec<DownloadLink>> {
        self.fetch_episode_links(session, episode_session)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, session, episode_session, "episode links unavailable")
            })
            .ok()
    }

    async fn airing_page(&self, page: u32) -> Option<AiringFeedPage> {
        self.airing.fetch_page(page).await
    }
}
