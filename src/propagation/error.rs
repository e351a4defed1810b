use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("invalid tle: {0}")]
    Tle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("epoch conversion failed: {0}")]
    Epoch(String),
    #[error("propagation failed: {0}")]
    Propagation(String),
}
