//! Process-local repositories used when no database URL is configured.
//!
//! State lives behind `std::sync::Mutex` and is lost on restart. The guards
//! are never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    InvitationRepository, InvitationRepositoryError, ListingRepository, ListingRepositoryError,
    ReviewRepository, ReviewRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Invitation, Review, ReviewId, Role, ServiceListing, Tier, User, UserId};

fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    query: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex
        .lock()
        .map_err(|_| query("in-memory store lock poisoned"))
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    /// Repository pre-populated with `users`.
    pub fn seeded(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id().clone(), user))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = lock(&self.users, UserPersistenceError::query)?;
        Ok(users.get(id).cloned())
    }

    async fn insert_if_absent(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut users = lock(&self.users, UserPersistenceError::query)?;
        if users.contains_key(user.id()) {
            return Ok(false);
        }
        users.insert(user.id().clone(), user.clone());
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let users = lock(&self.users, UserPersistenceError::query)?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.email().as_ref().cmp(b.email().as_ref()));
        Ok(all)
    }

    async fn update_access(
        &self,
        id: &UserId,
        tier: Tier,
        role: Role,
    ) -> Result<bool, UserPersistenceError> {
        let mut users = lock(&self.users, UserPersistenceError::query)?;
        let Some(existing) = users.remove(id) else {
            return Ok(false);
        };
        users.insert(id.clone(), existing.with_access(tier, role));
        Ok(true)
    }
}

/// In-memory [`ReviewRepository`] keyed by the deterministic review id.
#[derive(Debug, Default)]
pub struct MemoryReviewRepository {
    reviews: Mutex<HashMap<ReviewId, Review>>,
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn create_if_absent(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut reviews = lock(&self.reviews, ReviewRepositoryError::query)?;
        if reviews.contains_key(review.id()) {
            return Ok(false);
        }
        reviews.insert(review.id().clone(), review.clone());
        Ok(true)
    }

    async fn list_for_reviewee(
        &self,
        reviewee: &UserId,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        let reviews = lock(&self.reviews, ReviewRepositoryError::query)?;
        let mut found: Vec<Review> = reviews
            .values()
            .filter(|review| review.reviewee_id() == reviewee)
            .cloned()
            .collect();
        found.sort_by_key(|review| std::cmp::Reverse(review.created_at()));
        Ok(found)
    }
}

/// In-memory [`ListingRepository`].
#[derive(Debug, Default)]
pub struct MemoryListingRepository {
    listings: Mutex<Vec<ServiceListing>>,
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn insert(&self, listing: &ServiceListing) -> Result<(), ListingRepositoryError> {
        lock(&self.listings, ListingRepositoryError::query)?.push(listing.clone());
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<ServiceListing>, ListingRepositoryError> {
        let mut listings = lock(&self.listings, ListingRepositoryError::query)?.clone();
        listings.sort_by_key(|listing| std::cmp::Reverse(listing.created_at()));
        Ok(listings)
    }
}

/// In-memory [`InvitationRepository`] with code uniqueness.
#[derive(Debug, Default)]
pub struct MemoryInvitationRepository {
    invitations: Mutex<HashMap<String, Invitation>>,
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError> {
        let mut invitations = lock(&self.invitations, InvitationRepositoryError::query)?;
        let code = invitation.code.as_ref();
        if invitations.contains_key(code) {
            return Err(InvitationRepositoryError::duplicate_code(code));
        }
        invitations.insert(code.to_owned(), invitation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccountStatus, Email, InvitationDraft, InviteCode, ListingRecord, ReviewSubmission,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("uid")
    }

    fn user(id: &str, email: &str) -> User {
        User::new(
            uid(id),
            Email::new(email).expect("email"),
            Role::Customer,
            Tier::Free,
            AccountStatus::Active,
            0.0,
        )
        .expect("user")
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
            .single()
            .expect("timestamp")
    }

    #[rstest]
    #[tokio::test]
    async fn first_insert_wins_and_update_touches_access_only() {
        let repo = MemoryUserRepository::default();
        assert!(repo.insert_if_absent(&user("u1", "one@example.com")).await.expect("insert"));
        assert!(!repo.insert_if_absent(&user("u1", "other@example.com")).await.expect("insert"));

        assert!(
            repo.update_access(&uid("u1"), Tier::Platinum, Role::Provider)
                .await
                .expect("update")
        );
        let stored = repo.find_by_id(&uid("u1")).await.expect("find").expect("present");
        assert_eq!(stored.email().as_ref(), "one@example.com");
        assert_eq!(stored.tier(), Tier::Platinum);
        assert_eq!(stored.role(), Role::Provider);

        assert!(
            !repo
                .update_access(&uid("ghost"), Tier::Gold, Role::Admin)
                .await
                .expect("update")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn users_are_listed_by_email() {
        let repo = MemoryUserRepository::seeded([
            user("b", "zed@example.com"),
            user("a", "amy@example.com"),
        ]);
        let emails: Vec<String> = repo
            .list_all()
            .await
            .expect("list")
            .iter()
            .map(|u| u.email().as_ref().to_owned())
            .collect();
        assert_eq!(emails, ["amy@example.com", "zed@example.com"]);
    }

    fn review(reviewer: &str, reviewee: &str, hour: u32) -> Review {
        ReviewSubmission::validate(uid(reviewer), uid(reviewee), 4, "Great hands, on time.")
            .expect("submission")
            .into_review(at(hour))
    }

    #[rstest]
    #[tokio::test]
    async fn second_review_for_the_same_pair_is_ignored() {
        let repo = MemoryReviewRepository::default();
        assert!(repo.create_if_absent(&review("a", "p", 1)).await.expect("create"));
        assert!(!repo.create_if_absent(&review("a", "p", 2)).await.expect("create"));
        assert!(repo.create_if_absent(&review("b", "p", 3)).await.expect("create"));

        let listed = repo.list_for_reviewee(&uid("p")).await.expect("list");
        let hours: Vec<_> = listed.iter().map(Review::created_at).collect();
        assert_eq!(hours, [at(3), at(1)]);
    }

    #[rstest]
    #[tokio::test]
    async fn listings_come_back_newest_first() {
        let repo = MemoryListingRepository::default();
        for hour in [2, 5, 1] {
            let listing = ServiceListing::try_from(ListingRecord {
                id: Uuid::new_v4(),
                provider_id: uid("p"),
                service_type: "barber".to_owned(),
                description: "Classic cuts and hot towel shaves on the road.".to_owned(),
                rate: 45.0,
                location: "Austin, TX".to_owned(),
                instagram_url: None,
                image_url: None,
                created_at: at(hour),
            })
            .expect("listing");
            repo.insert(&listing).await.expect("insert");
        }
        let order: Vec<_> = repo
            .list_newest_first()
            .await
            .expect("list")
            .iter()
            .map(ServiceListing::created_at)
            .collect();
        assert_eq!(order, [at(5), at(2), at(1)]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_invite_code_is_rejected() {
        let repo = MemoryInvitationRepository::default();
        let issue = || {
            Invitation::issue(
                InvitationDraft {
                    email: "guest@example.com".to_owned(),
                    tier: "gold".to_owned(),
                    coupon_code: None,
                    discount_percentage: None,
                },
                uid("admin"),
                InviteCode::from_stored("ABCD2345"),
                at(9),
            )
            .expect("invitation")
        };
        repo.insert(&issue()).await.expect("first insert");
        let err = repo.insert(&issue()).await.expect_err("duplicate");
        assert!(matches!(
            err,
            InvitationRepositoryError::DuplicateCode { ref code } if code == "ABCD2345"
        ));
    }
}
