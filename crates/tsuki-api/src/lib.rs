//! Typed access to the remote anime catalog.

pub mod airing;
pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::{CatalogClient, Endpoints};
pub use error::CatalogError;
pub use traits::{
    AiringEntry, AiringFeedPage, Catalog, DownloadLink, Episode, SearchHit, SeriesPage,
};
