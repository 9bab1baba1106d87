//! Plain-text rendering of catalog records.

use tsuki_api::{AiringEntry, Episode, SearchHit};

/// One-line summary of a search hit: title plus whatever metadata is known.
pub fn search_hit(hit: &SearchHit) -> String {
    let mut meta = Vec::new();
    if let Some(kind) = &hit.kind {
        meta.push(kind.clone());
    }
    if let Some(year) = hit.year {
        meta.push(year.to_string());
    }
    if let Some(episodes) = hit.episodes {
        meta.push(format!("{episodes} eps"));
    }
    if let Some(score) = hit.score {
        meta.push(format!("★ {score:.2}"));
    }
    if let Some(status) = &hit.status {
        meta.push(status.clone());
    }

    if meta.is_empty() {
        hit.title.clone()
    } else {
        format!("{} ({})", hit.title, meta.join(", "))
    }
}

pub fn episode(ep: &Episode, focused: bool) -> String {
    let marker = if focused { ">" } else { " " };
    format!("{marker} Episode {:<6} {}", ep.episode, ep.session)
}

pub fn airing_entry(entry: &AiringEntry) -> String {
    match &entry.fansub {
        Some(fansub) => format!("{} - Episode {} [{fansub}]", entry.anime_title, entry.episode),
        None => format!("{} - Episode {}", entry.anime_title, entry.episode),
    }
}

/// "Page 2 of 5".
pub fn page_indicator(page: u32, total: u32) -> String {
    format!("Page {page} of {}", total.max(page))
}
