//! Tests for the admin service and the mutation gate.

use super::*;
use crate::domain::ports::{MockInvitationRepository, MockUserRepository};
use crate::domain::{Email, ErrorCode, Feature, resolve_access};
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("fixture uid")
}

fn user(id: &str, role: Role, tier: Tier, status: AccountStatus, revenue: f64) -> User {
    User::new(
        uid(id),
        Email::new(format!("{id}@example.com")).expect("email"),
        role,
        tier,
        status,
        revenue,
    )
    .expect("valid user")
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(fixed_now);
    Arc::new(clock)
}

fn users_with_caller(role: Role) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(|id| id.as_ref() == "caller")
        .returning(move |_| {
            Ok(Some(user(
                "caller",
                role,
                Tier::Free,
                AccountStatus::Active,
                0.0,
            )))
        });
    users
}

fn draft(tier: &str) -> InvitationDraft {
    InvitationDraft {
        email: "guest@example.com".to_owned(),
        tier: tier.to_owned(),
        coupon_code: None,
        discount_percentage: None,
    }
}

#[rstest]
#[case(Role::Customer)]
#[case(Role::Provider)]
fn gate_rejects_non_admin_roles(#[case] role: Role) {
    let err = authorize_access_change(role).expect_err("non-admin");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn customer_cannot_change_access(clock: Arc<dyn Clock>) {
    let mut users = users_with_caller(Role::Customer);
    users.expect_update_access().never();
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let err = service
        .update_user_tier_and_role(&uid("caller"), &uid("target"), Tier::Platinum, Role::Admin)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn unknown_caller_is_unauthorized(clock: Arc<dyn Clock>) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    users.expect_update_access().never();
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let err = service
        .update_user_tier_and_role(&uid("caller"), &uid("target"), Tier::Gold, Role::Customer)
        .await
        .expect_err("unauthorized");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn admin_grants_platinum_without_admin_role(clock: Arc<dyn Clock>) {
    let mut users = users_with_caller(Role::Admin);
    users
        .expect_update_access()
        .withf(|id, tier, role| {
            id.as_ref() == "target" && *tier == Tier::Platinum && *role == Role::Customer
        })
        .times(1)
        .return_once(|_, _, _| Ok(true));
    users
        .expect_find_by_id()
        .withf(|id| id.as_ref() == "target")
        .return_once(|_| {
            Ok(Some(user(
                "target",
                Role::Customer,
                Tier::Platinum,
                AccountStatus::Active,
                120.0,
            )))
        });
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let updated = service
        .update_user_tier_and_role(
            &uid("caller"),
            &uid("target"),
            Tier::Platinum,
            Role::Customer,
        )
        .await
        .expect("updated");
    assert_eq!(updated.tier(), Tier::Platinum);
    assert_eq!(updated.role(), Role::Customer);
    assert_eq!(updated.revenue(), 120.0);

    let features = resolve_access(updated.tier(), updated.role());
    for feature in [
        Feature::Revenue,
        Feature::Clients,
        Feature::Community,
        Feature::RoadTrip,
        Feature::Masseurbnb,
    ] {
        assert!(features.allows(feature), "{feature} should be granted");
    }
    assert!(!features.allows(Feature::Admin));
}

#[rstest]
#[tokio::test]
async fn missing_target_is_not_found(clock: Arc<dyn Clock>) {
    let mut users = users_with_caller(Role::Admin);
    users
        .expect_update_access()
        .return_once(|_, _, _| Ok(false));
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let err = service
        .update_user_tier_and_role(&uid("caller"), &uid("ghost"), Tier::Gold, Role::Provider)
        .await
        .expect_err("not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn stats_sum_revenue_and_count_active(clock: Arc<dyn Clock>) {
    let mut users = users_with_caller(Role::Admin);
    users.expect_list_all().return_once(|| {
        Ok(vec![
            user("a", Role::Admin, Tier::Free, AccountStatus::Active, 10.5),
            user("b", Role::Provider, Tier::Gold, AccountStatus::Active, 20.0),
            user("c", Role::Customer, Tier::Silver, AccountStatus::Canceled, 0.0),
            user("d", Role::Customer, Tier::Free, AccountStatus::Active, 4.5),
        ])
    });
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let stats = service.stats(&uid("caller")).await.expect("stats");
    assert_eq!(stats.total_users, 4);
    assert_eq!(stats.active_subscriptions, 3);
    assert_eq!(stats.total_revenue, 35.0);
}

#[rstest]
#[tokio::test]
async fn listing_users_requires_admin(clock: Arc<dyn Clock>) {
    let mut users = users_with_caller(Role::Provider);
    users.expect_list_all().never();
    let service = AdminService::new(
        Arc::new(users),
        Arc::new(MockInvitationRepository::new()),
        clock,
    );

    let err = service.list_users(&uid("caller")).await.expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn invitation_retries_on_duplicate_code(clock: Arc<dyn Clock>) {
    let mut invitations = MockInvitationRepository::new();
    let mut seq = mockall::Sequence::new();
    invitations
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|inv| Err(InvitationRepositoryError::duplicate_code(inv.code.as_ref())));
    invitations
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    let service = AdminService::new(
        Arc::new(users_with_caller(Role::Admin)),
        Arc::new(invitations),
        clock,
    );

    let invitation = service
        .create_invitation(&uid("caller"), draft("gold"))
        .await
        .expect("issued");
    assert_eq!(invitation.created_by, uid("caller"));
    assert_eq!(invitation.created_at, fixed_now());
    assert!(invitation.link.starts_with("/signup?email=guest%40example.com&tier=gold&code="));
}

#[rstest]
#[tokio::test]
async fn invalid_invitation_tier_is_rejected(clock: Arc<dyn Clock>) {
    let mut invitations = MockInvitationRepository::new();
    invitations.expect_insert().never();
    let service = AdminService::new(
        Arc::new(users_with_caller(Role::Admin)),
        Arc::new(invitations),
        clock,
    );

    let err = service
        .create_invitation(&uid("caller"), draft("silver"))
        .await
        .expect_err("invalid tier");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
        Some("tier")
    );
}
