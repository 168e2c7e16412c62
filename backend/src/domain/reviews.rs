//! Peer reviews: validated review values, the read-side aggregate and the
//! submission guard.
//!
//! Reviews are immutable once stored. At most one review exists per
//! reviewer/reviewee pair; [`ReviewId::for_pair`] derives the storage key from
//! the pair so the store's create-if-absent primitive enforces that
//! atomically.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::UserId;

/// Shortest accepted comment, in characters.
pub const COMMENT_MIN: usize = 10;
/// Longest accepted comment, in characters.
pub const COMMENT_MAX: usize = 500;

/// Validation failures for review submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating outside 1..=5.
    #[error("rating must be a whole number between 1 and 5, got {0}")]
    RatingOutOfRange(i64),
    #[error("comment must be at least {min} characters")]
    CommentTooShort { min: usize },
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
    #[error("you cannot review yourself")]
    SelfReview,
    #[error("review id must be a 64 character hex digest")]
    InvalidId,
}

impl ReviewValidationError {
    /// Request field the failure relates to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange(_) => "rating",
            Self::CommentTooShort { .. } | Self::CommentTooLong { .. } => "comment",
            Self::SelfReview => "revieweeId",
            Self::InvalidId => "id",
        }
    }

    /// Stable machine-readable code for the failure.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange(_) => "rating_out_of_range",
            Self::CommentTooShort { .. } => "comment_too_short",
            Self::CommentTooLong { .. } => "comment_too_long",
            Self::SelfReview => "self_review",
            Self::InvalidId => "invalid_id",
        }
    }
}

/// Deterministic review key derived from the reviewer/reviewee pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewId(String);

impl ReviewId {
    /// Key for the review `reviewer` writes about `reviewee`.
    ///
    /// # Examples
    /// ```
    /// use masseurpro::domain::{ReviewId, UserId};
    ///
    /// let a = UserId::new("alice").unwrap();
    /// let b = UserId::new("bob").unwrap();
    /// assert_eq!(ReviewId::for_pair(&a, &b), ReviewId::for_pair(&a, &b));
    /// assert_ne!(ReviewId::for_pair(&a, &b), ReviewId::for_pair(&b, &a));
    /// ```
    pub fn for_pair(reviewer: &UserId, reviewee: &UserId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(reviewer.as_ref().as_bytes());
        hasher.update([0_u8]);
        hasher.update(reviewee.as_ref().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Rehydrate a stored key.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let raw = raw.into();
        if raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(ReviewValidationError::InvalidId)
        }
    }
}

impl AsRef<str> for ReviewId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ReviewId> for String {
    fn from(value: ReviewId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewId {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Accept whole stars from 1 to 5.
    pub fn new(value: i64) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(ReviewValidationError::RatingOutOfRange(value))
    }

    /// Number of stars.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Review text between [`COMMENT_MIN`] and [`COMMENT_MAX`] characters.
///
/// The text is stored as submitted. Whitespace counts towards the length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewComment(String);

impl ReviewComment {
    /// Validate the character count of `text`.
    pub fn new(text: impl AsRef<str>) -> Result<Self, ReviewValidationError> {
        let text = text.as_ref();
        let length = text.chars().count();
        if length < COMMENT_MIN {
            return Err(ReviewValidationError::CommentTooShort { min: COMMENT_MIN });
        }
        if length > COMMENT_MAX {
            return Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self(text.to_owned()))
    }
}

impl AsRef<str> for ReviewComment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReviewComment> for String {
    fn from(value: ReviewComment) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewComment {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A validated review that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    reviewer_id: UserId,
    reviewee_id: UserId,
    rating: Rating,
    comment: ReviewComment,
}

impl ReviewSubmission {
    /// Check the shape of a submission. Uniqueness is checked by the store.
    pub fn validate(
        reviewer_id: UserId,
        reviewee_id: UserId,
        rating: i64,
        comment: &str,
    ) -> Result<Self, ReviewValidationError> {
        if reviewer_id == reviewee_id {
            return Err(ReviewValidationError::SelfReview);
        }
        Ok(Self {
            rating: Rating::new(rating)?,
            comment: ReviewComment::new(comment)?,
            reviewer_id,
            reviewee_id,
        })
    }

    /// Account being reviewed.
    pub fn reviewee_id(&self) -> &UserId {
        &self.reviewee_id
    }

    /// Account writing the review.
    pub fn reviewer_id(&self) -> &UserId {
        &self.reviewer_id
    }

    /// Stamp the submission with its key and creation time.
    pub fn into_review(self, created_at: DateTime<Utc>) -> Review {
        Review {
            id: ReviewId::for_pair(&self.reviewer_id, &self.reviewee_id),
            reviewer_id: self.reviewer_id,
            reviewee_id: self.reviewee_id,
            rating: self.rating,
            comment: self.comment,
            created_at,
        }
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[schema(value_type = String)]
    id: ReviewId,
    #[schema(value_type = String)]
    reviewer_id: UserId,
    #[schema(value_type = String)]
    reviewee_id: UserId,
    #[schema(value_type = u8, minimum = 1, maximum = 5)]
    rating: Rating,
    #[schema(value_type = String)]
    comment: ReviewComment,
    created_at: DateTime<Utc>,
}

/// Raw parts used when rehydrating a stored review.
pub struct ReviewDraft {
    pub id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Errors raised when a stored review fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoredReviewError {
    #[error(transparent)]
    Review(#[from] ReviewValidationError),
    #[error(transparent)]
    User(#[from] super::UserValidationError),
}

impl TryFrom<ReviewDraft> for Review {
    type Error = StoredReviewError;

    fn try_from(draft: ReviewDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReviewId::parse(draft.id)?,
            reviewer_id: UserId::new(draft.reviewer_id)?,
            reviewee_id: UserId::new(draft.reviewee_id)?,
            rating: Rating::new(draft.rating)?,
            comment: ReviewComment::new(draft.comment)?,
            created_at: draft.created_at,
        })
    }
}

impl Review {
    /// Key derived from the reviewer/reviewee pair.
    pub fn id(&self) -> &ReviewId {
        &self.id
    }

    pub fn reviewer_id(&self) -> &UserId {
        &self.reviewer_id
    }

    pub fn reviewee_id(&self) -> &UserId {
        &self.reviewee_id
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn comment(&self) -> &ReviewComment {
        &self.comment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Reputation aggregate recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    /// Unrounded arithmetic mean; `0.0` when there are no reviews.
    pub average_rating: f64,
    /// Number of reviews the average covers.
    pub count: usize,
}

/// Average rating and count over `reviews`.
///
/// # Examples
/// ```
/// use masseurpro::domain::aggregate;
///
/// let summary = aggregate(&[]);
/// assert_eq!(summary.count, 0);
/// assert_eq!(summary.average_rating, 0.0);
/// ```
pub fn aggregate(reviews: &[Review]) -> ReviewSummary {
    let count = reviews.len();
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating.get())).sum();
    let divisor = u32::try_from(count.max(1)).map_or(f64::from(u32::MAX), f64::from);
    ReviewSummary {
        average_rating: f64::from(total) / divisor,
        count,
    }
}

/// Whether `current_user` may review `reviewee` given the reviews already
/// written about them.
pub fn can_review(
    current_user: Option<&UserId>,
    reviewee: &UserId,
    existing_reviews: &[Review],
) -> bool {
    let Some(current_user) = current_user else {
        return false;
    };
    current_user != reviewee
        && !existing_reviews
            .iter()
            .any(|review| review.reviewer_id() == current_user)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("fixture uid")
    }

    fn review(reviewer: &str, reviewee: &str, rating: i64) -> Review {
        ReviewSubmission::validate(uid(reviewer), uid(reviewee), rating, "Great session, thanks!")
            .expect("valid submission")
            .into_review(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).single().expect("date"))
    }

    #[fixture]
    fn reviewee() -> UserId {
        uid("provider-1")
    }

    #[rstest]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(
            aggregate(&[]),
            ReviewSummary {
                average_rating: 0.0,
                count: 0
            }
        );
    }

    #[rstest]
    fn aggregate_is_unrounded_mean() {
        let reviews = [review("a", "p", 5), review("b", "p", 3)];
        assert_eq!(
            aggregate(&reviews),
            ReviewSummary {
                average_rating: 4.0,
                count: 2
            }
        );

        let reviews = [review("a", "p", 5), review("b", "p", 4), review("c", "p", 4)];
        let summary = aggregate(&reviews);
        assert!((summary.average_rating - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn cannot_review_without_a_user(reviewee: UserId) {
        assert!(!can_review(None, &reviewee, &[]));
    }

    #[rstest]
    fn cannot_review_self(reviewee: UserId) {
        assert!(!can_review(Some(&reviewee), &reviewee, &[]));
    }

    #[rstest]
    fn cannot_review_twice(reviewee: UserId) {
        let existing = [review("client-1", "provider-1", 4)];
        assert!(!can_review(Some(&uid("client-1")), &reviewee, &existing));
    }

    #[rstest]
    fn other_reviews_do_not_block(reviewee: UserId) {
        let existing = [review("client-2", "provider-1", 4)];
        assert!(can_review(Some(&uid("client-1")), &reviewee, &existing));
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-3)]
    #[case(256)]
    fn rating_bounds(#[case] raw: i64) {
        assert_eq!(
            Rating::new(raw),
            Err(ReviewValidationError::RatingOutOfRange(raw))
        );
    }

    #[rstest]
    fn comment_length_boundaries() {
        assert_eq!(
            ReviewComment::new("a".repeat(9)),
            Err(ReviewValidationError::CommentTooShort { min: COMMENT_MIN })
        );
        assert!(ReviewComment::new("a".repeat(10)).is_ok());
        assert!(ReviewComment::new("a".repeat(500)).is_ok());
        assert_eq!(
            ReviewComment::new("a".repeat(501)),
            Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX })
        );
    }

    #[rstest]
    #[case(" great job", true)]
    #[case("great job ", true)]
    #[case(" great jo ", true)]
    #[case("  great  ", false)]
    fn comment_whitespace_counts_towards_the_length(#[case] text: &str, #[case] accepted: bool) {
        let result = ReviewComment::new(text);
        assert_eq!(result.is_ok(), accepted, "{text:?}");
        if let Ok(comment) = result {
            assert_eq!(comment.as_ref(), text);
        }
    }

    #[rstest]
    fn comment_counts_characters_not_bytes() {
        assert!(ReviewComment::new("é".repeat(10)).is_ok());
    }

    #[rstest]
    fn self_review_is_rejected_before_other_checks() {
        let result = ReviewSubmission::validate(uid("same"), uid("same"), 9, "short");
        assert_eq!(result, Err(ReviewValidationError::SelfReview));
    }

    #[rstest]
    fn review_key_is_stable_hex() {
        let id = ReviewId::for_pair(&uid("a"), &uid("b"));
        assert_eq!(id.as_ref().len(), 64);
        assert_eq!(ReviewId::parse(id.to_string()), Ok(id));
    }

    #[rstest]
    fn review_key_does_not_collide_on_concatenation() {
        assert_ne!(
            ReviewId::for_pair(&uid("ab"), &uid("c")),
            ReviewId::for_pair(&uid("a"), &uid("bc"))
        );
    }
}
