//! Error types for the call log.

/// Errors that can occur while reading or writing the call log.
#[derive(Debug, thiserror::Error)]
pub enum CallLogError {
    /// A database operation failed.
    #[error("call log database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled connection was available.
    #[error("call log connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    /// The blocking task running the query panicked or was cancelled.
    #[error("call log task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
