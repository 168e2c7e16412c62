//! Admin-issued invitations to paid tiers.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Email, Plan, UserId};

/// Alphabet for invite codes; omits look-alike characters.
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of a generated invite code.
pub const INVITE_CODE_LEN: usize = 8;
const COUPON_MAX: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvitationValidationError {
    #[error("email is not a valid address")]
    InvalidEmail,
    #[error("invitations are only available for gold or platinum")]
    InvalidTier,
    #[error("coupon code may only contain letters, digits, '-' or '_' (max {max})")]
    InvalidCoupon { max: usize },
    #[error("discount must be between 0 and 100 percent")]
    InvalidDiscount,
}

impl InvitationValidationError {
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::InvalidTier => "tier",
            Self::InvalidCoupon { .. } => "couponCode",
            Self::InvalidDiscount => "discountPercentage",
        }
    }
}

/// Random, human-friendly invite code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    /// Draw a fresh code from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..INVITE_CODE_LEN)
            .map(|_| {
                let index = rng.gen_range(0..INVITE_ALPHABET.len());
                char::from(INVITE_ALPHABET.get(index).copied().unwrap_or(b'A'))
            })
            .collect();
        Self(code)
    }

    /// Rehydrate a stored code.
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl AsRef<str> for InviteCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unvalidated invitation request from the admin panel.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDraft {
    pub email: String,
    #[schema(example = "gold")]
    pub tier: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
}

/// A stored invitation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    #[schema(value_type = String, example = "K7PQ2MXA")]
    pub code: InviteCode,
    #[schema(value_type = String)]
    pub email: Email,
    pub tier: Plan,
    pub coupon_code: Option<String>,
    pub discount_percentage: Option<u8>,
    #[schema(value_type = String)]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Relative sign-up link carrying the invitation parameters.
    pub link: String,
}

fn validate_coupon(raw: Option<String>) -> Result<Option<String>, InvitationValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let valid = trimmed.chars().count() <= COUPON_MAX
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(Some(trimmed.to_owned()))
    } else {
        Err(InvitationValidationError::InvalidCoupon { max: COUPON_MAX })
    }
}

fn validate_discount(raw: Option<f64>) -> Result<Option<u8>, InvitationValidationError> {
    match raw {
        None => Ok(None),
        Some(value) if value.is_finite() && (0.0..=100.0).contains(&value) => {
            // Range checked above, so the rounded value fits in a u8.
            Ok(Some(value.round() as u8))
        }
        Some(_) => Err(InvitationValidationError::InvalidDiscount),
    }
}

/// Build the relative sign-up link for an invitation.
pub fn signup_link(
    email: &Email,
    tier: Plan,
    code: &InviteCode,
    coupon_code: Option<&str>,
    discount: Option<u8>,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("email", email.as_ref())
        .append_pair("tier", tier.as_str())
        .append_pair("code", code.as_ref());
    if let Some(coupon) = coupon_code {
        query.append_pair("coupon", coupon);
        if let Some(discount) = discount {
            query.append_pair("discount", &discount.to_string());
        }
    }
    format!("/signup?{}", query.finish())
}

impl Invitation {
    /// Validate `draft` and stamp it with a code and issuer.
    pub fn issue(
        draft: InvitationDraft,
        created_by: UserId,
        code: InviteCode,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InvitationValidationError> {
        let email =
            Email::new(&draft.email).map_err(|_| InvitationValidationError::InvalidEmail)?;
        let tier = draft
            .tier
            .parse::<Plan>()
            .map_err(|_| InvitationValidationError::InvalidTier)?;
        let coupon_code = validate_coupon(draft.coupon_code)?;
        let discount_percentage = validate_discount(draft.discount_percentage)?;
        let link = signup_link(
            &email,
            tier,
            &code,
            coupon_code.as_deref(),
            discount_percentage,
        );
        Ok(Self {
            code,
            email,
            tier,
            coupon_code,
            discount_percentage,
            created_by,
            created_at,
            link,
        })
    }
}
