//! Error types for a single delivery attempt

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid ingest URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Store rejected the update with status {0}")]
    Rejected(reqwest::StatusCode),
}
