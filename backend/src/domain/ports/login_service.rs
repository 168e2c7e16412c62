//! Driving port for sign-in and registration.
use async_trait::async_trait;

use crate::domain::{Email, Error, LoginCredentials, User};

/// Authenticates credentials and returns the matching user record, creating
/// it on first sign-in.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Sign in with an existing account.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Register a new account and create its user record.
    async fn sign_up(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Send a password-reset email. Succeeds whether or not an account
    /// exists for `email`.
    async fn request_password_reset(&self, email: &Email) -> Result<(), Error>;
}
