#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input rejected locally before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
