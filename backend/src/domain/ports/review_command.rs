//! Driving port for review submission.
use async_trait::async_trait;

use crate::domain::{Error, ReviewId, UserId};

#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Validate and store a review of `reviewee` written by `reviewer`.
    async fn submit_review(
        &self,
        reviewer: &UserId,
        reviewee: &UserId,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewId, Error>;
}
