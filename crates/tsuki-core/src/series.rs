use tsuki_api::{Catalog, Episode, SearchHit, SeriesPage};

use crate::links::LinkCache;
use crate::load::{Generation, LoadState};
use crate::locator::{EpisodeLocator, JumpRejection};

/// A series page fetch issued by [`SeriesBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub session: String,
    pub page: u32,
    ticket: u64,
}

/// Result of an episode jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Fetch this page; the episode is focused once it loads.
    Navigate(PageRequest),
    /// The episode belongs to the page already shown; focus moved in place.
    SamePage,
    Rejected(JumpRejection),
    /// Nothing is loaded yet, so the page shape is unknown.
    NotLoaded,
}

/// Paginated episode browser for one series.
#[derive(Debug)]
pub struct SeriesBrowser {
    hit: SearchHit,
    page: u32,
    details: Option<SeriesPage>,
    state: LoadState,
    locator: EpisodeLocator,
    focus: Option<u32>,
    generation: Generation,
    links: LinkCache,
}

impl SeriesBrowser {
    pub fn new(hit: SearchHit, locator: EpisodeLocator) -> Self {
        let links = LinkCache::new(hit.session.clone());
        Self {
            hit,
            page: 1,
            details: None,
            state: LoadState::Idle,
            locator,
            focus: None,
            generation: Generation::default(),
            links,
        }
    }

    /// Start on `page` instead of the first page. A start past the last page
    /// is corrected by [`SeriesBrowser::settle`] once the range is known.
    pub fn starting_at(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn hit(&self) -> &SearchHit {
        &self.hit
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn details(&self) -> Option<&SeriesPage> {
        self.details.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn locator(&self) -> &EpisodeLocator {
        &self.locator
    }

    /// Episode number the view should bring into focus, if any.
    pub fn focus(&self) -> Option<u32> {
        self.focus
    }

    pub fn links(&self) -> &LinkCache {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkCache {
        &mut self.links
    }

    /// Cover art: the page's own image when present, else the search poster.
    pub fn display_image(&self) -> &str {
        self.details
            .as_ref()
            .and_then(|d| d.img.as_deref())
            .filter(|img| !img.is_empty())
            .unwrap_or(self.hit.poster.as_str())
    }

    /// Episode matching the focus target on the loaded page. `None` when the
    /// size estimate sent the jump to a page that lacks it.
    pub fn focused_episode(&self) -> Option<&Episode> {
        let target = self.focus?;
        self.details.as_ref()?.find_episode(target)
    }

    fn request(&mut self, page: u32) -> PageRequest {
        self.page = page;
        self.state = LoadState::Loading;
        PageRequest {
            session: self.hit.session.clone(),
            page,
            ticket: self.generation.next(),
        }
    }

    /// (Re)fetch the current page. Used for the first load and manual retry.
    pub fn reload(&mut self) -> PageRequest {
        self.request(self.page)
    }

    /// Manual page navigation. Clears any focus target.
    ///
    /// Pages outside `[1, total_pages]`, the current page, and requests made
    /// before any page has loaded are ignored.
    pub fn go_to_page(&mut self, page: u32) -> Option<PageRequest> {
        let total_pages = self.details.as_ref()?.total_pages;
        if page == 0 || page > total_pages || page == self.page {
            tracing::debug!(page, total_pages, "ignoring page change");
            return None;
        }
        self.focus = None;
        Some(self.request(page))
    }

    /// Jump to an episode number typed by the user.
    pub fn jump(&mut self, input: &str) -> JumpOutcome {
        let Some(details) = self.details.as_ref() else {
            return JumpOutcome::NotLoaded;
        };
        match self.locator.locate(input, details) {
            Ok(target) => {
                tracing::debug!(episode = target.episode, page = target.page, "episode jump");
                self.focus = Some(target.episode);
                if target.page == self.page && self.state == LoadState::Ready {
                    JumpOutcome::SamePage
                } else {
                    JumpOutcome::Navigate(self.request(target.page))
                }
            }
            Err(rejection) => {
                tracing::debug!(input, ?rejection, "episode jump rejected");
                JumpOutcome::Rejected(rejection)
            }
        }
    }

    /// Apply the catalog's answer to `request`.
    ///
    /// Returns `false` and leaves all state untouched if a newer request was
    /// issued in the meantime.
    pub fn apply(&mut self, request: &PageRequest, result: Option<SeriesPage>) -> bool {
        if !self.generation.is_current(request.ticket) {
            tracing::debug!(
                page = request.page,
                current = self.page,
                "discarding stale series page"
            );
            return false;
        }
        match result {
            Some(details) => {
                self.locator.observe(&details);
                self.details = Some(details);
                self.state = LoadState::Ready;
            }
            None => {
                self.details = None;
                self.state = LoadState::Unavailable;
            }
        }
        true
    }

    /// Request the last page when the loaded page lies past `total_pages`.
    pub fn settle(&mut self) -> Option<PageRequest> {
        if self.state != LoadState::Ready {
            return None;
        }
        let total_pages = self.details.as_ref()?.total_pages;
        if total_pages == 0 || self.page <= total_pages {
            return None;
        }
        tracing::debug!(
            page = self.page,
            total_pages,
            "series page past the end, moving to the last page"
        );
        Some(self.request(total_pages))
    }

    /// Run `request` against `catalog` and apply the result, then settle onto
    /// the last page at most once.
    pub async fn load<C: Catalog>(&mut self, catalog: &C, request: PageRequest) -> bool {
        let result = catalog.series_page(&request.session, request.page).await;
        if !self.apply(&request, result) {
            return false;
        }
        if let Some(request) = self.settle() {
            let result = catalog.series_page(&request.session, request.page).await;
            self.apply(&request, result);
        }
        true
    }
}
