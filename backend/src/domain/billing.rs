//! Paid plans and subscription creation.
//!
//! Creating a subscription does not change the caller's tier. Tier changes
//! stay an admin action until processor webhooks are wired in.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::accounts::load_caller;
use crate::domain::ports::{
    PaymentProcessor, PaymentProcessorError, SubscriptionCommand, SubscriptionRequest,
    UserRepository,
};
use crate::domain::{Error, Tier, UserId};

/// Purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Gold,
    Platinum,
}

/// Error returned for plan names outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid plan '{0}'; expected gold or platinum")]
pub struct UnknownPlan(pub String);

impl Plan {
    /// Lowercase plan name as accepted on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Tier the plan corresponds to.
    pub const fn tier(self) -> Tier {
        match self {
            Self::Gold => Tier::Gold,
            Self::Platinum => Tier::Platinum,
        }
    }
}

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(UnknownPlan(s.to_owned())),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionReceipt {
    /// Processor-issued subscription id.
    pub subscription_id: String,
    /// Processor status, e.g. `active`.
    pub status: String,
    pub plan: Plan,
}

fn map_processor_error(error: PaymentProcessorError) -> Error {
    match error {
        PaymentProcessorError::Rejected { message } => {
            Error::invalid_request(format!("payment rejected: {message}"))
        }
        other => Error::service_unavailable(other.to_string()),
    }
}

fn missing_field(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required"))
        .with_details(json!({ "field": field, "code": "missing" }))
}

/// Subscription service implementing [`SubscriptionCommand`].
#[derive(Clone)]
pub struct SubscriptionService<U, P> {
    users: Arc<U>,
    payments: Arc<P>,
}

impl<U, P> SubscriptionService<U, P> {
    /// Create the service over the user store and payment processor.
    pub fn new(users: Arc<U>, payments: Arc<P>) -> Self {
        Self { users, payments }
    }
}

#[async_trait]
impl<U, P> SubscriptionCommand for SubscriptionService<U, P>
where
    U: UserRepository,
    P: PaymentProcessor,
{
    async fn create_subscription(
        &self,
        caller: &UserId,
        payment_method_id: Option<&str>,
        plan: Option<&str>,
    ) -> Result<SubscriptionReceipt, Error> {
        let payment_method_id = payment_method_id
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| missing_field("paymentMethodId"))?;
        let plan = plan
            .map(str::trim)
            .filter(|plan| !plan.is_empty())
            .ok_or_else(|| missing_field("plan"))?
            .parse::<Plan>()
            .map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "field": "plan", "code": "invalid_plan" }))
            })?;

        let user = load_caller(self.users.as_ref(), caller).await?;
        let request = SubscriptionRequest {
            email: user.email().clone(),
            payment_method_id: payment_method_id.to_owned(),
            plan,
        };
        let subscription = self
            .payments
            .create_subscription(&request)
            .await
            .map_err(|err| {
                warn!(user_id = %caller, plan = %plan, error = %err, "subscription failed");
                map_processor_error(err)
            })?;

        info!(
            user_id = %caller,
            plan = %plan,
            subscription_id = %subscription.subscription_id,
            "subscription created"
        );
        Ok(SubscriptionReceipt {
            subscription_id: subscription.subscription_id,
            status: subscription.status,
            plan,
        })
    }
}
