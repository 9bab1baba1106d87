use tsuki_api::{Catalog, SearchHit};
use tsuki_core::{
    AiringFeed, AppConfig, AudioGroup, JumpOutcome, JumpRejection, LoadState, SearchSession,
    SeriesBrowser,
};

use crate::format;

pub async fn search<C: Catalog>(catalog: &C, input: &str) {
    let mut session = SearchSession::new();
    let Some(request) = session.submit(input) else {
        println!("Nothing to search for.");
        return;
    };
    session.run(catalog, request).await;

    if session.results().is_empty() {
        println!("No results for \"{}\".", session.query());
        return;
    }
    for hit in session.results() {
        println!("{}", format::search_hit(hit));
        println!("    session: {}", hit.session);
    }
}

/// A bare handoff for a series known only by its session token.
fn session_hit(session: &str) -> SearchHit {
    SearchHit {
        id: 0,
        title: session.to_string(),
        poster: String::new(),
        session: session.to_string(),
        kind: None,
        episodes: None,
        status: None,
        season: None,
        year: None,
        score: None,
    }
}

pub async fn series<C: Catalog>(
    catalog: &C,
    config: &AppConfig,
    session: &str,
    page: u32,
    jump: Option<&str>,
) {
    let browser = SeriesBrowser::new(session_hit(session), config.locator()).starting_at(page);
    open_series(catalog, browser, jump).await;
}

async fn open_series<C: Catalog>(catalog: &C, mut browser: SeriesBrowser, jump: Option<&str>) {
    let request = browser.reload();
    browser.load(catalog, request).await;

    if let Some(input) = jump {
        match browser.jump(input) {
            JumpOutcome::Navigate(request) => {
                browser.load(catalog, request).await;
            }
            JumpOutcome::SamePage | JumpOutcome::NotLoaded => {}
            JumpOutcome::Rejected(JumpRejection::NotANumber) => {
                println!("\"{input}\" is not an episode number.");
            }
            JumpOutcome::Rejected(JumpRejection::OutOfRange { .. }) => {
                println!("Episode {input} is out of range.");
            }
        }
    }

    let Some(details) = browser.details() else {
        println!("Unable to load episodes for this series.");
        return;
    };

    let title = if details.title.is_empty() {
        &browser.hit().title
    } else {
        &details.title
    };
    println!("{title} ({} episodes)", details.total);
    if let Some(synopsis) = &details.synopsis {
        println!("{synopsis}");
    }
    println!("Cover: {}", browser.display_image());
    println!();

    if details.episodes.is_empty() {
        println!("No episodes found.");
    }
    let focused = browser.focused_episode().map(|ep| ep.session.as_str());
    for ep in &details.episodes {
        println!("{}", format::episode(ep, focused == Some(ep.session.as_str())));
    }
    if let (Some(target), None) = (browser.focus(), focused) {
        tracing::debug!(target, page = browser.page(), "focus target not on loaded page");
    }
    println!();
    println!("{}", format::page_indicator(details.page, details.total_pages));
}

pub async fn links<C: Catalog>(catalog: &C, session: &str, episode: &str, dub: bool) {
    let mut cache = tsuki_core::LinkCache::new(session);
    cache.expand_with(catalog, episode).await;

    let Some(entry) = cache.entry(episode) else {
        return;
    };
    if entry.error {
        println!("Failed to load links.");
        return;
    }
    if dub && !cache.switch_group(episode, AudioGroup::Dub) {
        println!("No dub links; showing subtitles.");
    }

    let Some(entry) = cache.entry(episode) else {
        return;
    };
    println!("{}:", entry.selected);
    for (i, link) in entry.visible().iter().enumerate() {
        println!("  {:<32} {}", link.label(i), link.link);
    }
    if entry.visible().is_empty() {
        println!("  No links available.");
    }
}

pub async fn airing<C: Catalog>(catalog: &C, config: &AppConfig, page: u32, open: Option<usize>) {
    let mut feed = AiringFeed::new().starting_at(page);
    let request = feed.refresh();
    feed.load(catalog, request).await;

    if feed.state() == LoadState::Unavailable {
        println!("Unable to load the airing feed. Try again later.");
        return;
    }

    if let Some(position) = open {
        let Some(hit) = position.checked_sub(1).and_then(|i| feed.select(i)) else {
            println!("No entry at position {position}.");
            return;
        };
        let browser = SeriesBrowser::new(hit, config.locator());
        open_series(catalog, browser, None).await;
        return;
    }

    for (i, entry) in feed.entries().iter().enumerate() {
        println!("{:>3}. {}", i + 1, format::airing_entry(entry));
    }
    println!();
    println!("{}", format::page_indicator(feed.page(), feed.last_page()));
}
