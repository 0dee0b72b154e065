use thiserror::Error;

/// Error surfaced by the connection layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Driver-level failure
    #[error("MongoDB driver error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The server could not be reached or did not answer the ping
    #[error("could not establish a connection: {0}")]
    Unreachable(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
