use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("collection {0} lock poisoned")]
    Poisoned(&'static str),
}
