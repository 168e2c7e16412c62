//! Port for admin-issued invitation persistence.
use async_trait::async_trait;

use crate::domain::Invitation;

use super::define_port_error;

define_port_error! {
    /// Errors raised by invitation repository adapters.
    pub enum InvitationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "invitation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invitation repository query failed: {message}",
        /// The generated invite code is already in use.
        DuplicateCode { code: String } => "invite code {code} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persist a new invitation.
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError>;
}
