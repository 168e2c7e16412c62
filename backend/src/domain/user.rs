//! User data model: identity, role, tier and account status.
//!
//! Role and tier each have two parsers. `FromStr` is strict and used for
//! request payloads; `parse_lenient` is used when reading stored records and
//! falls back to the most restrictive value so a corrupted row never grants
//! extra access.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be at most {max} characters")]
    IdTooLong { max: usize },
    #[error("user id may only contain letters, digits, '-' or '_'")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email is not a valid address")]
    InvalidEmail,
    #[error("revenue must be a finite, non-negative amount")]
    InvalidRevenue,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("unknown tier '{0}'")]
    UnknownTier(String),
    #[error("unknown account status '{0}'")]
    UnknownStatus(String),
}

/// Maximum length of an identity-provider uid.
pub const USER_ID_MAX: usize = 128;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;

static USER_ID_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn user_id_regex() -> &'static Regex {
    USER_ID_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_-]+$")
            .unwrap_or_else(|error| panic!("user id regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Opaque user identifier issued by the identity provider.
///
/// # Examples
/// ```
/// use masseurpro::domain::UserId;
///
/// let id = UserId::new("kX9f2Lq0Ab").expect("valid uid");
/// assert_eq!(id.as_ref(), "kX9f2Lq0Ab");
/// assert!(UserId::new("no spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        if !user_id_regex().is_match(&id) {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account capability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Provider,
}

impl Role {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Provider => "provider",
        }
    }

    /// Parse a stored value, treating anything unknown as `customer`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Customer)
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "provider" => Ok(Self::Provider),
            _ => Err(UserValidationError::UnknownRole(s.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription level, ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Parse a stored value, treating anything unknown as `free`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Free)
    }
}

impl FromStr for Tier {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(UserValidationError::UnknownTier(s.to_owned())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Canceled,
}

impl AccountStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Canceled => "canceled",
        }
    }

    /// Parse a stored value, treating anything unknown as `canceled`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Canceled)
    }
}

impl FromStr for AccountStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(UserValidationError::UnknownStatus(s.to_owned())),
        }
    }
}

/// Persisted user record.
///
/// ## Invariants
/// - `revenue` is finite and non-negative.
/// - An `admin` role is always treated as `platinum`; see
///   [`User::effective_tier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "kX9f2Lq0Ab")]
    id: UserId,
    #[schema(value_type = String, example = "alex@example.com")]
    email: Email,
    role: Role,
    tier: Tier,
    status: AccountStatus,
    #[schema(example = 0.0)]
    revenue: f64,
}

impl User {
    /// Build a validated user record.
    pub fn new(
        id: UserId,
        email: Email,
        role: Role,
        tier: Tier,
        status: AccountStatus,
        revenue: f64,
    ) -> Result<Self, UserValidationError> {
        if !revenue.is_finite() || revenue < 0.0 {
            return Err(UserValidationError::InvalidRevenue);
        }
        Ok(Self {
            id,
            email,
            role,
            tier,
            status,
            revenue,
        })
    }

    /// Default record created the first time an identity signs in.
    ///
    /// # Examples
    /// ```
    /// use masseurpro::domain::{Email, Role, Tier, User, UserId};
    ///
    /// let user = User::first_sign_in(
    ///     UserId::new("uid1").unwrap(),
    ///     Email::new("a@b.co").unwrap(),
    /// );
    /// assert_eq!(user.role(), Role::Customer);
    /// assert_eq!(user.tier(), Tier::Free);
    /// ```
    pub fn first_sign_in(id: UserId, email: Email) -> Self {
        Self {
            id,
            email,
            role: Role::Customer,
            tier: Tier::Free,
            status: AccountStatus::Active,
            revenue: 0.0,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Tier as stored, before the admin override.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Tier used for entitlement decisions.
    pub fn effective_tier(&self) -> Tier {
        if self.is_admin() {
            Tier::Platinum
        } else {
            self.tier
        }
    }

    /// Replace tier and role, leaving every other field untouched.
    pub fn with_access(mut self, tier: Tier, role: Role) -> Self {
        self.tier = tier;
        self.role = role;
        self
    }
}
