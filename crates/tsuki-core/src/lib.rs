//! Navigation engine over the anime catalog: episode jumps, per-episode link
//! groups and the airing feed.

pub mod airing;
pub mod config;
pub mod error;
pub mod links;
pub mod load;
pub mod locator;
pub mod search;
pub mod series;

#[cfg(test)]
mod testing;

pub use airing::{AiringFeed, AiringRequest};
pub use config::AppConfig;
pub use error::CoreError;
pub use links::{partition_links, AudioGroup, LinkCache, LinkCacheEntry, LinkRequest};
pub use load::LoadState;
pub use locator::{EpisodeLocator, JumpRejection, JumpTarget};
pub use search::{SearchRequest, SearchSession};
pub use series::{JumpOutcome, PageRequest, SeriesBrowser};
