//! Pieces shared by every backend: the error type and startup retry.

pub mod error;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use retry::{retry, retry_with, RetrySettings};
