use thiserror::Error;

/// Failures raised while looking a page up through the MediaWiki API.
///
/// The dispatcher treats every variant the same way (the page is reported as
/// `NOT_FOUND`); the distinction exists for diagnostics.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("api error [{code}]: {info}")]
    Api { code: String, info: String },
    #[error("failed to decode API response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("page not found: {0}")]
    NotFound(String),
    #[error("invalid MediaWiki response shape: {0}")]
    InvalidResponse(&'static str),
}
