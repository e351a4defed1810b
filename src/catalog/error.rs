use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("feed returned status {0}")]
    Status(u16),
    #[error("feed body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("feed body is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("feed file error: {0}")]
    Io(#[from] std::io::Error),
}

/// A malformed element-set block. `block` is the zero-based index of the 3-line block.
#[derive(Debug, Error, PartialEq)]
#[error("block {block}: {reason}")]
pub struct ParseError {
    pub block: usize,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}
