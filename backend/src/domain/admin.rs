//! Admin panel use-cases and the admin mutation gate.
//!
//! The caller's role is always re-derived from their stored user record. The
//! gate never accepts an "is admin" flag from the request.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::accounts::{load_caller, map_user_persistence_error};
use crate::domain::ports::{
    AdminCommand, AdminQuery, InvitationRepository, InvitationRepositoryError, UserRepository,
};
use crate::domain::{
    AccountStatus, Error, Invitation, InvitationDraft, InviteCode, Role, Tier, User, UserId,
};

const INVITE_CODE_ATTEMPTS: usize = 3;

/// Allow the mutation only when `caller_role` is admin.
///
/// # Examples
/// ```
/// use masseurpro::domain::{authorize_access_change, ErrorCode, Role};
///
/// assert!(authorize_access_change(Role::Admin).is_ok());
/// let err = authorize_access_change(Role::Customer).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn authorize_access_change(caller_role: Role) -> Result<(), Error> {
    if caller_role == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("Access Denied").with_details(json!({ "requiredRole": "admin" })))
    }
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Every stored account, whatever its status.
    pub total_users: usize,
    /// Users whose account status is active.
    pub active_subscriptions: usize,
    /// Sum of recorded revenue across all users.
    pub total_revenue: f64,
}

impl AdminStats {
    /// Compute the headline numbers over `users`.
    pub fn from_users(users: &[User]) -> Self {
        Self {
            total_users: users.len(),
            active_subscriptions: users
                .iter()
                .filter(|user| user.status() == AccountStatus::Active)
                .count(),
            total_revenue: users.iter().map(User::revenue).sum(),
        }
    }
}

fn map_invitation_error(error: InvitationRepositoryError) -> Error {
    match error {
        InvitationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("invitation repository unavailable: {message}"))
        }
        other => Error::internal(format!("invitation repository error: {other}")),
    }
}

/// Admin service implementing [`AdminCommand`] and [`AdminQuery`].
#[derive(Clone)]
pub struct AdminService<U, V> {
    users: Arc<U>,
    invitations: Arc<V>,
    clock: Arc<dyn Clock>,
}

impl<U, V> AdminService<U, V> {
    /// Create the service over the user and invitation stores.
    pub fn new(users: Arc<U>, invitations: Arc<V>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            invitations,
            clock,
        }
    }
}

impl<U, V> AdminService<U, V>
where
    U: UserRepository,
{
    async fn require_admin(&self, caller: &UserId) -> Result<User, Error> {
        let user = load_caller(self.users.as_ref(), caller).await?;
        authorize_access_change(user.role()).inspect_err(|_| {
            warn!(user_id = %caller, role = %user.role(), "non-admin attempted admin action");
        })?;
        Ok(user)
    }
}

#[async_trait]
impl<U, V> AdminCommand for AdminService<U, V>
where
    U: UserRepository,
    V: InvitationRepository,
{
    async fn update_user_tier_and_role(
        &self,
        caller: &UserId,
        target: &UserId,
        tier: Tier,
        role: Role,
    ) -> Result<User, Error> {
        self.require_admin(caller).await?;

        let updated = self
            .users
            .update_access(target, tier, role)
            .await
            .map_err(map_user_persistence_error)?;
        if !updated {
            return Err(Error::not_found(format!("user {target} not found")));
        }
        info!(
            admin_id = %caller,
            user_id = %target,
            tier = %tier,
            role = %role,
            "user access updated"
        );

        self.users
            .find_by_id(target)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))
    }

    async fn create_invitation(
        &self,
        caller: &UserId,
        draft: InvitationDraft,
    ) -> Result<Invitation, Error> {
        self.require_admin(caller).await?;

        let mut last_error = None;
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = InviteCode::generate(&mut rand::thread_rng());
            let invitation =
                Invitation::issue(draft.clone(), caller.clone(), code, self.clock.utc())
                    .map_err(|err| {
                        Error::invalid_request(err.to_string())
                            .with_details(json!({ "field": err.field() }))
                    })?;
            match self.invitations.insert(&invitation).await {
                Ok(()) => {
                    info!(admin_id = %caller, tier = %invitation.tier, "invitation issued");
                    return Ok(invitation);
                }
                Err(err @ InvitationRepositoryError::DuplicateCode { .. }) => {
                    last_error = Some(err);
                }
                Err(err) => return Err(map_invitation_error(err)),
            }
        }
        Err(last_error.map_or_else(
            || Error::internal("failed to allocate invite code"),
            map_invitation_error,
        ))
    }
}

#[async_trait]
impl<U, V> AdminQuery for AdminService<U, V>
where
    U: UserRepository,
    V: InvitationRepository,
{
    async fn list_users(&self, caller: &UserId) -> Result<Vec<User>, Error> {
        self.require_admin(caller).await?;
        self.users
            .list_all()
            .await
            .map_err(map_user_persistence_error)
    }

    async fn stats(&self, caller: &UserId) -> Result<AdminStats, Error> {
        let users = self.list_users(caller).await?;
        Ok(AdminStats::from_users(&users))
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
