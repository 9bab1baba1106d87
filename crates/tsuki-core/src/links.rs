use std::collections::HashMap;

use tsuki_api::{Catalog, DownloadLink};

use crate::load::Generation;

/// Link lists at or below this length are not split.
pub const SPLIT_THRESHOLD: usize = 3;

/// Audio variant a link group stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioGroup {
    #[default]
    Sub,
    Dub,
}

impl std::fmt::Display for AudioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sub => write!(f, "Subtitles"),
            Self::Dub => write!(f, "English Dub"),
        }
    }
}

/// Split a flat link list into (sub, dub) groups by position.
///
/// The catalog does not label audio tracks. Its lists put subtitled links
/// first, so lists longer than [`SPLIT_THRESHOLD`] are cut at `ceil(len / 2)`
/// and shorter ones are all treated as subtitled. This is an approximation of
/// unlabeled data and will misfile links for releases that break the pattern.
pub fn partition_links(links: Vec<DownloadLink>) -> (Vec<DownloadLink>, Vec<DownloadLink>) {
    if links.len() <= SPLIT_THRESHOLD {
        return (links, Vec::new());
    }
    let mid = links.len().div_ceil(2);
    let mut sub = links;
    let dub = sub.split_off(mid);
    (sub, dub)
}

/// Link state for one expanded episode row.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCacheEntry {
    pub loading: bool,
    pub sub: Vec<DownloadLink>,
    pub dub: Vec<DownloadLink>,
    pub error: bool,
    pub selected: AudioGroup,
    ticket: u64,
}

impl LinkCacheEntry {
    fn pending(ticket: u64) -> Self {
        Self {
            loading: true,
            sub: Vec::new(),
            dub: Vec::new(),
            error: false,
            selected: AudioGroup::Sub,
            ticket,
        }
    }

    pub fn has_dub(&self) -> bool {
        !self.dub.is_empty()
    }

    /// Links of the selected group.
    pub fn visible(&self) -> &[DownloadLink] {
        match self.selected {
            AudioGroup::Sub => &self.sub,
            AudioGroup::Dub => &self.dub,
        }
    }
}

/// A link fetch issued by [`LinkCache::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub session: String,
    pub episode_session: String,
    ticket: u64,
}

/// Fetch-once link cache for the episode rows of one series.
///
/// An entry lives from expansion to collapse. While it exists, expanding the
/// row again does nothing, including after a failed fetch; collapsing and
/// re-expanding is the way to retry.
#[derive(Debug)]
pub struct LinkCache {
    session: String,
    entries: HashMap<String, LinkCacheEntry>,
    generation: Generation,
}

impl LinkCache {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            entries: HashMap::new(),
            generation: Generation::default(),
        }
    }

    pub fn entry(&self, episode_session: &str) -> Option<&LinkCacheEntry> {
        self.entries.get(episode_session)
    }

    pub fn is_expanded(&self, episode_session: &str) -> bool {
        self.entries.contains_key(episode_session)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a row. Returns the fetch to run, or `None` if the row is already open.
    pub fn expand(&mut self, episode_session: &str) -> Option<LinkRequest> {
        if self.entries.contains_key(episode_session) {
            return None;
        }
        let ticket = self.generation.next();
        self.entries
            .insert(episode_session.to_string(), LinkCacheEntry::pending(ticket));
        Some(LinkRequest {
            session: self.session.clone(),
            episode_session: episode_session.to_string(),
            ticket,
        })
    }

    /// Close a row and drop its links. Returns whether the row was open.
    pub fn collapse(&mut self, episode_session: &str) -> bool {
        self.entries.remove(episode_session).is_some()
    }

    /// Collapse an open row or expand a closed one.
    pub fn toggle(&mut self, episode_session: &str) -> Option<LinkRequest> {
        if self.collapse(episode_session) {
            None
        } else {
            self.expand(episode_session)
        }
    }

    /// Store the outcome of `request`.
    ///
    /// Returns `false` when the row was collapsed (or collapsed and reopened)
    /// after the request was issued; the result is then dropped.
    pub fn resolve(
        &mut self,
        request: &LinkRequest,
        result: Option<Vec<DownloadLink>>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&request.episode_session) else {
            tracing::debug!(
                episode = %request.episode_session,
                "links arrived for a collapsed row"
            );
            return false;
        };
        if entry.ticket != request.ticket || !entry.loading {
            tracing::debug!(episode = %request.episode_session, "discarding stale link result");
            return false;
        }

        let links = result.unwrap_or_default();
        entry.loading = false;
        entry.selected = AudioGroup::Sub;
        if links.is_empty() {
            entry.error = true;
            entry.sub.clear();
            entry.dub.clear();
        } else {
            let (sub, dub) = partition_links(links);
            tracing::debug!(
                episode = %request.episode_session,
                sub = sub.len(),
                dub = dub.len(),
                "episode links resolved"
            );
            entry.error = false;
            entry.sub = sub;
            entry.dub = dub;
        }
        true
    }

    /// Select the audio group shown for a row.
    ///
    /// Switching to [`AudioGroup::Dub`] is ignored while the dub group is
    /// empty. Returns whether the selection changed.
    pub fn switch_group(&mut self, episode_session: &str, group: AudioGroup) -> bool {
        let Some(entry) = self.entries.get_mut(episode_session) else {
            return false;
        };
        if group == AudioGroup::Dub && !entry.has_dub() {
            return false;
        }
        let changed = entry.selected != group;
        entry.selected = group;
        changed
    }

    /// Expand a row and, if that issued a fetch, run it to completion.
    ///
    /// Returns whether a request was sent.
    pub async fn expand_with<C: Catalog>(&mut self, catalog: &C, episode_session: &str) -> bool {
        let Some(request) = self.expand(episode_session) else {
            return false;
        };
        let result = catalog
            .episode_links(&request.session, &request.episode_session)
            .await;
        self.resolve(&request, result);
        true
    }
}
