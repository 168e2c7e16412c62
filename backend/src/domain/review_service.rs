//! Review submission use-case.
//!
//! Validation happens in the domain; uniqueness per reviewer/reviewee pair is
//! delegated to the repository's atomic create-if-absent on the deterministic
//! [`ReviewId`], so two concurrent submissions cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::accounts::{
    load_caller, map_review_repository_error, map_user_persistence_error,
};
use crate::domain::ports::{ReviewCommand, ReviewRepository, UserRepository};
use crate::domain::{Error, ReviewId, ReviewSubmission, ReviewValidationError, UserId};

fn map_validation_error(error: ReviewValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": error.field(), "code": error.code() }))
}

/// Review service implementing [`ReviewCommand`].
#[derive(Clone)]
pub struct ReviewService<U, R> {
    users: Arc<U>,
    reviews: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, R> ReviewService<U, R> {
    /// Create the service; `clock` stamps each stored review.
    pub fn new(users: Arc<U>, reviews: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            reviews,
            clock,
        }
    }
}

#[async_trait]
impl<U, R> ReviewCommand for ReviewService<U, R>
where
    U: UserRepository,
    R: ReviewRepository,
{
    async fn submit_review(
        &self,
        reviewer: &UserId,
        reviewee: &UserId,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewId, Error> {
        let submission =
            ReviewSubmission::validate(reviewer.clone(), reviewee.clone(), rating, comment)
                .map_err(map_validation_error)?;

        load_caller(self.users.as_ref(), reviewer).await?;
        let reviewee_exists = self
            .users
            .find_by_id(reviewee)
            .await
            .map_err(map_user_persistence_error)?
            .is_some();
        if !reviewee_exists {
            return Err(Error::not_found(format!("user {reviewee} not found")));
        }

        let review = submission.into_review(self.clock.utc());
        let created = self
            .reviews
            .create_if_absent(&review)
            .await
            .map_err(map_review_repository_error)?;
        if !created {
            debug!(reviewer_id = %reviewer, reviewee_id = %reviewee, "duplicate review rejected");
            return Err(Error::conflict("you have already reviewed this user"));
        }

        info!(reviewer_id = %reviewer, reviewee_id = %reviewee, "review stored");
        Ok(review.id().clone())
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
