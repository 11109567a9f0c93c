//! Error type shared by the stream client, configuration and rendering engine.

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    /// The rendering host could not provide a drawing surface.
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,
}
