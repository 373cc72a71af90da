use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("live view already running")]
    AlreadyRunning,
}
