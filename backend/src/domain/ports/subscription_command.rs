//! Driving port for paid subscriptions.
use async_trait::async_trait;

use crate::domain::{Error, SubscriptionReceipt, UserId};

#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Subscribe the caller to `plan` using a payment-method token.
    async fn create_subscription(
        &self,
        caller: &UserId,
        payment_method_id: Option<&str>,
        plan: Option<&str>,
    ) -> Result<SubscriptionReceipt, Error>;
}
