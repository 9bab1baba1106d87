use tsuki_api::{Catalog, SearchHit};

use crate::load::{Generation, LoadState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    ticket: u64,
}

/// Title search state.
///
/// A failed search and a search with no matches look the same here: an
/// empty result list.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    results: Vec<SearchHit>,
    searched: bool,
    state: LoadState,
    generation: Generation,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last submitted query, trimmed.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn has_searched(&self) -> bool {
        self.searched
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Submit raw input. Blank input issues no request.
    pub fn submit(&mut self, input: &str) -> Option<SearchRequest> {
        let query = input.trim();
        if query.is_empty() {
            return None;
        }
        self.query = query.to_string();
        self.searched = true;
        self.state = LoadState::Loading;
        Some(SearchRequest {
            query: self.query.clone(),
            ticket: self.generation.next(),
        })
    }

    /// Store results for `request` unless a newer search superseded it.
    pub fn apply(&mut self, request: &SearchRequest, results: Vec<SearchHit>) -> bool {
        if !self.generation.is_current(request.ticket) {
            tracing::debug!(query = %request.query, "discarding stale search results");
            return false;
        }
        tracing::debug!(query = %request.query, hits = results.len(), "search finished");
        self.results = results;
        self.state = LoadState::Ready;
        true
    }

    pub async fn run<C: Catalog>(&mut self, catalog: &C, request: SearchRequest) -> bool {
        let results = catalog.search(&request.query).await;
        self.apply(&request, results)
    }

    pub fn hit(&self, index: usize) -> Option<&SearchHit> {
        self.results.get(index)
    }
}
