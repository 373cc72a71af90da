use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("record has no aircraft identity")]
    MissingIdentity,
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}
