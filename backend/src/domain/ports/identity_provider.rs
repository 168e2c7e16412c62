//! Port for the managed identity provider.
//!
//! The provider owns passwords. The domain only consumes the resulting
//! `{ uid, email }` pair.
use async_trait::async_trait;

use crate::domain::{Email, LoginCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Email/password pair was rejected.
        InvalidCredentials => "invalid credentials",
        /// Sign-up attempted for an email that already has an account.
        EmailTaken => "email already registered",
        /// Password rejected by the provider's policy.
        WeakPassword { message: String } => "password rejected: {message}",
        /// Provider could not be reached or returned an unexpected status.
        Upstream { message: String } => "identity provider unavailable: {message}",
        /// Provider response could not be decoded.
        Decode { message: String } => "identity provider response invalid: {message}",
    }
}

/// Identity proven by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Provider account id, reused as the user id.
    pub uid: UserId,
    /// Address the provider has on record.
    pub email: Email,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an email/password pair.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError>;

    /// Register a new email/password account.
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError>;

    /// Ask the provider to email a password-reset link.
    ///
    /// Unknown addresses surface as
    /// [`IdentityProviderError::InvalidCredentials`].
    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError>;
}
