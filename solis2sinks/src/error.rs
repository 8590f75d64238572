/// Failure while computing the request signature headers.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("HMAC key rejected")]
    InvalidKey,
}

/// Failure to turn a response body into a station record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contains no station record at data.page.records[0]")]
    NoRecord,
}

/// Failure of a single request against the SolisCloud API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Failure of one sink for one cycle. Never affects other sinks.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("broker not connected, dropped {0} values")]
    NotConnected(usize),
    #[error("record has no fields to write")]
    EmptyRecord,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("publish failed for {failed} of {total} values: {last}")]
    Publish {
        failed: usize,
        total: usize,
        last: String,
    },
}

/// Failure that ends a cycle before any sink is invoked.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ParseError),
}
