//! Error types for cache operations.

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing store could not be reached or operated on.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// The background sweeper task ended abnormally.
    #[error("Sweeper stopped: {0}")]
    SweeperStopped(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
