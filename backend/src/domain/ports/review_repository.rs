//! Port for review persistence.
use async_trait::async_trait;

use crate::domain::{Review, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
    }
}

/// Append-only review storage keyed by [`crate::domain::ReviewId`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Atomically store `review` unless its key already exists.
    ///
    /// Returns `false` when a review for the same reviewer/reviewee pair is
    /// already stored; the existing review is left untouched.
    async fn create_if_absent(&self, review: &Review) -> Result<bool, ReviewRepositoryError>;

    /// Reviews written about `reviewee`, newest first.
    async fn list_for_reviewee(&self, reviewee: &UserId)
    -> Result<Vec<Review>, ReviewRepositoryError>;
}
