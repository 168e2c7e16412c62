//! PostgreSQL-backed `ReviewRepository` adapter.
//!
//! `reviews.id` is the deterministic pair key, so `ON CONFLICT DO NOTHING`
//! gives an atomic create-if-absent even under concurrent submissions.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{Review, ReviewDraft, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel implementation of [`ReviewRepository`].
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewRepositoryError> {
    Review::try_from(ReviewDraft {
        id: row.id,
        reviewer_id: row.reviewer_id,
        reviewee_id: row.reviewee_id,
        rating: i64::from(row.rating),
        comment: row.comment,
        created_at: row.created_at,
    })
    .map_err(|err| ReviewRepositoryError::query(format!("stored review is invalid: {err}")))
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn create_if_absent(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReviewRow {
            id: review.id().as_ref(),
            reviewer_id: review.reviewer_id().as_ref(),
            reviewee_id: review.reviewee_id().as_ref(),
            rating: i16::from(review.rating().get()),
            comment: review.comment().as_ref(),
            created_at: review.created_at(),
        };
        let inserted = diesel::insert_into(reviews::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn list_for_reviewee(
        &self,
        reviewee: &UserId,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::reviewee_id.eq(reviewee.as_ref()))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }
}
