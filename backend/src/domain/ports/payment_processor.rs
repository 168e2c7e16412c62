//! Port for the subscription payment processor.
use async_trait::async_trait;

use crate::domain::{Email, Plan};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment processor adapters.
    pub enum PaymentProcessorError {
        /// No secret key or price id was configured.
        Unconfigured => "payment processor is not configured",
        /// The processor declined the request (bad card, unknown token).
        Rejected { message: String } => "payment rejected: {message}",
        /// Transport failure, timeout or unexpected status.
        Upstream { message: String } => "payment processor unavailable: {message}",
    }
}

/// Inputs for a new subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub email: Email,
    pub payment_method_id: String,
    pub plan: Plan,
}

/// Processor-side identifiers of a created subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSubscription {
    pub subscription_id: String,
    pub customer_id: String,
    pub status: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a customer, attach the payment method and subscribe it to `plan`.
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<ProcessorSubscription, PaymentProcessorError>;
}
