use tsuki_api::{AiringEntry, AiringFeedPage, Catalog, SearchHit};

use crate::load::{Generation, LoadState};

/// An airing feed fetch issued by [`AiringFeed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiringRequest {
    pub page: u32,
    ticket: u64,
}

/// "Just updated" feed with page navigation.
///
/// Source fallback happens inside the catalog client; this type only sees a
/// normalized page or the unavailable signal. Failures are not retried
/// automatically: the caller offers [`AiringFeed::refresh`].
#[derive(Debug)]
pub struct AiringFeed {
    page: u32,
    last_page: u32,
    total: u32,
    entries: Vec<AiringEntry>,
    state: LoadState,
    generation: Generation,
}

impl Default for AiringFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl AiringFeed {
    pub fn new() -> Self {
        Self {
            page: 1,
            last_page: 1,
            total: 0,
            entries: Vec::new(),
            state: LoadState::Idle,
            generation: Generation::default(),
        }
    }

    /// Start on `page`. The range is only known once a page has loaded; a
    /// start past the end is corrected by [`AiringFeed::settle`].
    pub fn starting_at(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn entries(&self) -> &[AiringEntry] {
        &self.entries
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page
    }

    fn request(&mut self, page: u32) -> AiringRequest {
        self.page = page;
        self.state = LoadState::Loading;
        AiringRequest {
            page,
            ticket: self.generation.next(),
        }
    }

    /// Fetch the current page: first load, or manual retry after a failure.
    pub fn refresh(&mut self) -> AiringRequest {
        self.request(self.page)
    }

    /// Move to `page`. Ignored unless it lies in `[1, last_page]` and differs
    /// from the current page, whatever the caller's buttons allowed.
    pub fn go_to_page(&mut self, page: u32) -> Option<AiringRequest> {
        if page == 0 || page > self.last_page || page == self.page {
            tracing::debug!(page, last_page = self.last_page, "ignoring airing page change");
            return None;
        }
        Some(self.request(page))
    }

    pub fn next_page(&mut self) -> Option<AiringRequest> {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<AiringRequest> {
        self.go_to_page(self.page.saturating_sub(1))
    }

    /// Apply the catalog's answer to `request`; stale answers are dropped.
    ///
    /// On failure the previous entries stay in place so the view can keep
    /// showing them next to the retry control.
    pub fn apply(&mut self, request: &AiringRequest, result: Option<AiringFeedPage>) -> bool {
        if !self.generation.is_current(request.ticket) {
            tracing::debug!(
                page = request.page,
                current = self.page,
                "discarding stale airing page"
            );
            return false;
        }
        match result {
            Some(feed) => {
                self.last_page = feed.last_page.max(1);
                self.total = feed.total;
                self.entries = feed.data;
                self.state = LoadState::Ready;
            }
            None => {
                tracing::warn!(page = request.page, "airing feed unavailable");
                self.state = LoadState::Unavailable;
            }
        }
        true
    }

    /// Handoff for opening the series behind entry `index`.
    pub fn select(&self, index: usize) -> Option<SearchHit> {
        self.entries.get(index).map(AiringEntry::to_search_hit)
    }

    /// Request the last page when the loaded page lies past the range the
    /// source reported.
    pub fn settle(&mut self) -> Option<AiringRequest> {
        if self.state != LoadState::Ready || self.page <= self.last_page {
            return None;
        }
        tracing::debug!(
            page = self.page,
            last_page = self.last_page,
            "airing page past the end, moving to the last page"
        );
        Some(self.request(self.last_page))
    }

    /// Run `request` and apply it, then settle onto the last page at most once.
    pub async fn load<C: Catalog>(&mut self, catalog: &C, request: AiringRequest) -> bool {
        let result = catalog.airing_page(request.page).await;
        if !self.apply(&request, result) {
            return false;
        }
        if let Some(request) = self.settle() {
            let result = catalog.airing_page(request.page).await;
            self.apply(&request, result);
        }
        true
    }
}
