//! In-process identity provider for local development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthenticatedIdentity, IdentityProvider, IdentityProviderError};
use crate::domain::{AccountStatus, Email, LoginCredentials, Role, Tier, User, UserId};

/// Development admin seeded into every fixture provider.
pub const FIXTURE_ADMIN_EMAIL: &str = "admin@masseurfriend.com";
pub const FIXTURE_ADMIN_PASSWORD: &str = "admin123";
pub const FIXTURE_ADMIN_UID: &str = "fixture-admin";

struct Account {
    uid: UserId,
    email: Email,
    password: Zeroizing<String>,
}

/// Email/password accounts kept in memory.
pub struct FixtureIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
}

impl FixtureIdentityProvider {
    /// Provider holding only the development admin account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Decode`] if the seeded constants are
    /// not valid identifiers.
    pub fn with_seeded_admin() -> Result<Self, IdentityProviderError> {
        let account = Account {
            uid: UserId::new(FIXTURE_ADMIN_UID)
                .map_err(|err| IdentityProviderError::decode(err.to_string()))?,
            email: Email::new(FIXTURE_ADMIN_EMAIL)
                .map_err(|err| IdentityProviderError::decode(err.to_string()))?,
            password: Zeroizing::new(FIXTURE_ADMIN_PASSWORD.to_owned()),
        };
        let mut accounts = HashMap::new();
        accounts.insert(account.email.as_ref().to_owned(), account);
        Ok(Self {
            accounts: Mutex::new(accounts),
        })
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, IdentityProviderError> {
        self.accounts
            .lock()
            .map_err(|_| IdentityProviderError::upstream("fixture account store poisoned"))
    }
}

/// User record matching the seeded admin account: admin role on platinum.
pub fn fixture_admin_user() -> Result<User, IdentityProviderError> {
    let uid = UserId::new(FIXTURE_ADMIN_UID)
        .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
    let email = Email::new(FIXTURE_ADMIN_EMAIL)
        .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
    User::new(uid, email, Role::Admin, Tier::Platinum, AccountStatus::Active, 0.0)
        .map_err(|err| IdentityProviderError::decode(err.to_string()))
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        let accounts = self.lock()?;
        match accounts.get(credentials.email().as_ref()) {
            Some(account) if account.password.as_str() == credentials.password() => {
                Ok(AuthenticatedIdentity {
                    uid: account.uid.clone(),
                    email: account.email.clone(),
                })
            }
            _ => Err(IdentityProviderError::invalid_credentials()),
        }
    }

    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        let mut accounts = self.lock()?;
        let key = credentials.email().as_ref().to_owned();
        if accounts.contains_key(&key) {
            return Err(IdentityProviderError::email_taken());
        }
        let uid = UserId::new(Uuid::new_v4().simple().to_string())
            .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
        let account = Account {
            uid: uid.clone(),
            email: credentials.email().clone(),
            password: Zeroizing::new(credentials.password().to_owned()),
        };
        accounts.insert(key, account);
        info!(user_id = %uid, "fixture account registered");
        Ok(AuthenticatedIdentity {
            uid,
            email: credentials.email().clone(),
        })
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError> {
        let accounts = self.lock()?;
        let account = accounts
            .get(email.as_ref())
            .ok_or_else(IdentityProviderError::invalid_credentials)?;
        info!(user_id = %account.uid, "fixture password reset skipped; no mail is sent");
        Ok(())
    }
}
