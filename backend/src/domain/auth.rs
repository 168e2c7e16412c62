//! Sign-in credentials.
//!
//! Inbound adapters turn raw payload strings into [`LoginCredentials`] before
//! talking to a port, so services only ever see a normalised email and a
//! non-empty password.

use zeroize::Zeroizing;

use super::{Email, UserValidationError};

/// Shortest password accepted when registering.
pub const NEW_PASSWORD_MIN: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    #[error("email is not a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is too short for a new account.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Validated email/password pair.
///
/// The password keeps caller-provided whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use masseurpro::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Sam@Example.com ", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "sam@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(|_: UserValidationError| {
            LoginValidationError::InvalidEmail
        })?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Apply the registration password policy.
    pub fn ensure_new_password_policy(&self) -> Result<(), LoginValidationError> {
        if self.password.chars().count() < NEW_PASSWORD_MIN {
            return Err(LoginValidationError::PasswordTooShort {
                min: NEW_PASSWORD_MIN,
            });
        }
        Ok(())
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
