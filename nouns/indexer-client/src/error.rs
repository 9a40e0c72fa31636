use {std::time::Duration, thiserror::Error};

/// Failure of a single indexer request. The client never falls back on its
/// own; callers decide what to do with this.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("indexer request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("indexer responded with HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("indexer returned no data: errors: {0}")]
    GraphQl(String),

    #[error("malformed indexer response: {0}")]
    Malformed(String),
}
