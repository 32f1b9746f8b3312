//! Rate feed error types.

use thiserror::Error;

/// Errors raised while talking to the upstream feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built.
    #[error("Failed to create request for {url}: {message}")]
    Request { url: String, message: String },

    /// The request could not be sent or the body could not be read.
    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Upstream answered with a non-success status.
    #[error("Unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised while turning upstream bytes into typed values.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A rate string is not a valid decimal number.
    #[error("Failed to parse rate {raw:?}")]
    InvalidRate { raw: String },

    /// The document declares a charset we cannot transcode.
    #[error("Unsupported charset {0:?}")]
    UnsupportedCharset(String),

    /// The body contains bytes that are invalid in its declared charset.
    #[error("Body is not valid {charset}")]
    Decode { charset: &'static str },

    /// The body is not a well-formed document of the expected shape.
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),
}

/// Errors surfaced by the rate queries.
#[derive(Debug, Error)]
pub enum RatesError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document is well formed but lacks the requested currency.
    #[error("{code} rate not found")]
    NotFound { code: String },
}

/// Result type for rate operations.
pub type RatesResult<T> = Result<T, RatesError>;
