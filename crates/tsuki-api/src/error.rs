use thiserror::Error;

/// Errors from the catalog HTTP client.
///
/// These never cross the [`Catalog`](crate::traits::Catalog) boundary; the
/// trait impl logs them and returns the unavailable signal instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unexpected response shape: missing {0}")]
    Shape(&'static str),
}
