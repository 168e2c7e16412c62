//! Driving port for the signed-in account and public profiles.
use async_trait::async_trait;

use crate::domain::{AccountView, Error, ProfileView, UserId};

#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// The caller's own record with resolved entitlements.
    async fn current_account(&self, user_id: &UserId) -> Result<AccountView, Error>;

    /// Public profile of `user_id` as seen by `viewer`.
    async fn profile(&self, viewer: Option<&UserId>, user_id: &UserId)
    -> Result<ProfileView, Error>;
}
