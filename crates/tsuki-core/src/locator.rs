use tsuki_api::SeriesPage;

/// Page size assumed before any page has been observed.
pub const FALLBACK_PAGE_SIZE: u32 = 20;

/// Where a jump to an episode number should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    pub episode: u32,
    pub page: u32,
}

/// Why a jump request produced no navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpRejection {
    NotANumber,
    OutOfRange { page: u32, total_pages: u32 },
}

/// Maps episode numbers to series pages.
///
/// The catalog has no episode-to-page lookup, so the page size is inferred
/// from traffic: any page that is not the last one must be full, and its
/// length is the page size. The estimate is best-effort; if upstream page
/// sizes vary, a jump can land on a page that lacks the episode.
#[derive(Debug, Clone)]
pub struct EpisodeLocator {
    estimate: Option<u32>,
    fallback_size: u32,
}

impl Default for EpisodeLocator {
    fn default() -> Self {
        Self::new(FALLBACK_PAGE_SIZE)
    }
}

impl EpisodeLocator {
    pub fn new(fallback_size: u32) -> Self {
        Self {
            estimate: None,
            fallback_size: fallback_size.max(1),
        }
    }

    pub fn estimate(&self) -> Option<u32> {
        self.estimate
    }

    /// Update the estimate from a freshly loaded page.
    ///
    /// The last page may be partial and never sets the estimate from its own
    /// length; it can only seed `ceil(total / total_pages)` when nothing
    /// better is known.
    pub fn observe(&mut self, page: &SeriesPage) {
        let len = u32::try_from(page.episodes.len()).unwrap_or(u32::MAX);
        if page.has_next() && len > 0 {
            if self.estimate != Some(len) {
                tracing::debug!(page = page.page, size = len, "page size estimate updated");
            }
            self.estimate = Some(len);
        } else if self.estimate.is_none() && page.total > 0 && page.total_pages > 0 {
            let derived = page.total.div_ceil(page.total_pages);
            tracing::debug!(
                total = page.total,
                total_pages = page.total_pages,
                size = derived,
                "page size estimate derived from totals"
            );
            self.estimate = Some(derived);
        }
    }

    /// Estimate, else the current page's length, else the fallback.
    pub fn page_size(&self, current: Option<&SeriesPage>) -> u32 {
        self.estimate
            .or_else(|| {
                current
                    .map(|p| u32::try_from(p.episodes.len()).unwrap_or(u32::MAX))
                    .filter(|&len| len > 0)
            })
            .unwrap_or(self.fallback_size)
    }

    /// Resolve raw jump input against the currently loaded page.
    pub fn locate(&self, input: &str, current: &SeriesPage) -> Result<JumpTarget, JumpRejection> {
        let episode = parse_episode_number(input).ok_or(JumpRejection::NotANumber)?;
        let size = self.page_size(Some(current));
        let page = episode.div_ceil(size);
        if page == 0 || page > current.total_pages {
            return Err(JumpRejection::OutOfRange {
                page,
                total_pages: current.total_pages,
            });
        }
        Ok(JumpTarget { episode, page })
    }
}

/// Parse user jump input. Anything that is not a plain non-negative integer
/// is rejected.
pub fn parse_episode_number(input: &str) -> Option<u32> {
    input.trim().parse().ok()
}
