//! Airing feed sources and the single-fallback chain between them.

use std::future::Future;

use reqwest::Client;

use crate::client::get_json;
use crate::error::CatalogError;
use crate::traits::AiringFeedPage;
use crate::types::{AiringResponse, ScheduleResponse};

/// A source of airing feed pages, already normalized to [`AiringFeedPage`].
pub trait AiringSource: Send + Sync {
    /// Short name for log output.
    fn name(&self) -> &'static str;

    fn fetch_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<AiringFeedPage, CatalogError>> + Send;
}

/// The catalog worker's `method=airing` endpoint.
pub struct PrimaryAiring {
    http: Client,
    base_url: String,
}

impl PrimaryAiring {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

impl AiringSource for PrimaryAiring {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn fetch_page(&self, page: u32) -> Result<AiringFeedPage, CatalogError> {
        let page_param = page.to_string();
        let body: AiringResponse = get_json(
            &self.http,
            &self.base_url,
            &[("method", "airing"), ("page", page_param.as_str())],
        )
        .await?;
        body.into_feed_page(page)
    }
}

/// The upstream schedule API, optionally reached through a passthrough proxy.
pub struct ScheduleAiring {
    http: Client,
    schedule_url: String,
    proxy_url: Option<String>,
}

impl ScheduleAiring {
    pub fn new(http: Client, schedule_url: String, proxy_url: Option<String>) -> Self {
        Self {
            http,
            schedule_url,
            proxy_url,
        }
    }

    /// The schedule URL for `page`, before any proxy wrapping.
    pub fn target_url(&self, page: u32) -> String {
        format!("{}?m=airing&page={page}", self.schedule_url)
    }
}

impl AiringSource for ScheduleAiring {
    fn name(&self) -> &'static str {
        "schedule"
    }

    async fn fetch_page(&self, page: u32) -> Result<AiringFeedPage, CatalogError> {
        let body: ScheduleResponse = match &self.proxy_url {
            Some(proxy) => {
                let target = self.target_url(page);
                get_json(&self.http, proxy, &[("url", target.as_str())]).await?
            }
            None => {
                let page_param = page.to_string();
                get_json(
                    &self.http,
                    &self.schedule_url,
                    &[("m", "airing"), ("page", page_param.as_str())],
                )
                .await?
            }
        };
        body.into_feed_page(page)
    }
}

/// Try `primary`; on any failure make exactly one request to `fallback`.
pub struct FallbackAiring<P, F> {
    primary: P,
    fallback: F,
}

impl<P: AiringSource, F: AiringSource> FallbackAiring<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Fetch `page`, returning `None` only when both sources failed.
    pub async fn fetch_page(&self, page: u32) -> Option<AiringFeedPage> {
        let primary_err = match self.primary.fetch_page(page).await {
            Ok(feed) => return Some(feed),
            Err(e) => e,
        };
        tracing::warn!(
            source = self.primary.name(),
            fallback = self.fallback.name(),
            page,
            error = %primary_err,
            "airing source failed, trying fallback"
        );

        match self.fallback.fetch_page(page).await {
            Ok(feed) => {
                tracing::info!(
                    source = self.fallback.name(),
                    page,
                    "airing page served by fallback"
                );
                Some(feed)
            }
            Err(e) => {
                tracing::warn!(
                    source = self.fallback.name(),
                    page,
                    error = %e,
                    "airing fallback failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use super::*;
    use crate::traits::AiringEntry;

    struct FakeSource {
        name: &'static str,
        fail: bool,
        last_page: u32,
        calls: AtomicUsize,
        requested: AtomicU32,
    }

    impl FakeSource {
        fn ok(name: &'static str, last_page: u32) -> Self {
            Self {
                name,
                fail: false,
                last_page,
                calls: AtomicUsize::new(0),
                requested: AtomicU32::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                fail: true,
                ..Self::ok(name, 0)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AiringSource for FakeSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_page(&self, page: u32) -> Result<AiringFeedPage, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.store(page, Ordering::SeqCst);
            if self.fail {
                return Err(CatalogError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(AiringFeedPage {
                current_page: page,
                last_page: self.last_page,
                data: vec![AiringEntry {
                    id: 1,
                    anime_id: 2,
                    anime_title: format!("{} entry", self.name),
                    anime_session: "s".into(),
                    episode: 3,
                    snapshot: String::new(),
                    created_at: String::new(),
                    fansub: None,
                }],
                total: 1,
            })
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let chain =
            FallbackAiring::new(FakeSource::ok("primary", 4), FakeSource::ok("fallback", 9));
        let page = chain.fetch_page(1).await.unwrap();
        assert_eq!(page.last_page, 4);
        assert_eq!(chain.primary.calls(), 1);
        assert_eq!(chain.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_makes_one_fallback_request() {
        let chain =
            FallbackAiring::new(FakeSource::failing("primary"), FakeSource::ok("fallback", 5));
        let page = chain.fetch_page(2).await.unwrap();
        assert_eq!(chain.primary.calls(), 1);
        assert_eq!(chain.fallback.calls(), 1);
        assert_eq!(chain.fallback.requested.load(Ordering::SeqCst), 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.last_page, 5);
        assert_eq!(page.data[0].anime_title, "fallback entry");
    }

    #[tokio::test]
    async fn test_both_failing_is_unavailable() {
        let chain = FallbackAiring::new(
            FakeSource::failing("primary"),
            FakeSource::failing("fallback"),
        );
        assert!(chain.fetch_page(3).await.is_none());
        assert_eq!(chain.primary.calls(), 1);
        assert_eq!(chain.fallback.calls(), 1);
    }

    #[test]
    fn test_schedule_target_url() {
        let source = ScheduleAiring::new(Client::new(), "https://animepahe.si/api".into(), None);
        assert_eq!(source.target_url(2), "https://animepahe.si/api?m=airing&page=2");
    }
}
