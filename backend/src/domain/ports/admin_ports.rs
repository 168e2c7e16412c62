//! Driving ports for the admin panel.
//!
//! Every method takes the caller's session user id. Implementations load the
//! caller's record and check the admin role themselves; no caller-supplied
//! flag is trusted.
use async_trait::async_trait;

use crate::domain::{AdminStats, Error, Invitation, InvitationDraft, Role, Tier, User, UserId};

#[async_trait]
pub trait AdminCommand: Send + Sync {
    /// Overwrite `tier` and `role` of `target`.
    async fn update_user_tier_and_role(
        &self,
        caller: &UserId,
        target: &UserId,
        tier: Tier,
        role: Role,
    ) -> Result<User, Error>;

    /// Issue a sign-up invitation.
    async fn create_invitation(
        &self,
        caller: &UserId,
        draft: InvitationDraft,
    ) -> Result<Invitation, Error>;
}

#[async_trait]
pub trait AdminQuery: Send + Sync {
    /// Every user record.
    async fn list_users(&self, caller: &UserId) -> Result<Vec<User>, Error>;

    /// Dashboard counters.
    async fn stats(&self, caller: &UserId) -> Result<AdminStats, Error>;
}
