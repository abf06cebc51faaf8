use thiserror::Error;

/// Raw date string matched neither the ISO-8601 nor the weekday dateline shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised date '{0}'")]
pub struct DateParseError(pub String);

/// Why a single post/page produced nothing. Never fatal for a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    DateParse(#[from] DateParseError),
    #[error("required markup '{missing}' not found")]
    Structural { missing: &'static str },
    #[error("no usable quotes")]
    NoQuotes,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate monologue for {author}: {content}")]
    Duplicate { author: String, content: String },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}
