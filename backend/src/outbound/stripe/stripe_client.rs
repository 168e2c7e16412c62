//! Reqwest-backed Stripe adapter for the payment-processor port.
//!
//! One subscription takes four form-encoded calls: create the customer,
//! attach the payment method, make it the invoice default, then subscribe
//! the customer to the plan's price.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::dto::{CustomerDto, ErrorEnvelopeDto, SubscriptionDto};
use crate::domain::Plan;
use crate::domain::ports::{
    PaymentProcessor, PaymentProcessorError, ProcessorSubscription, SubscriptionRequest,
};
use crate::outbound::http_preview::status_message;

/// Connection settings for [`StripeClient`].
pub struct StripeConfig {
    /// API base, e.g. `https://api.stripe.com/`.
    pub endpoint: Url,
    pub secret_key: Zeroizing<String>,
    /// Price id per purchasable plan.
    pub prices: HashMap<Plan, String>,
    pub timeout: Duration,
}

/// Stripe subscription client.
pub struct StripeClient {
    client: Client,
    endpoint: Url,
    secret_key: Zeroizing<String>,
    prices: HashMap<Plan, String>,
}

impl StripeClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error when the HTTP client cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            secret_key: config.secret_key,
            prices: config.prices,
        })
    }

    fn price_for(&self, plan: Plan) -> Result<&str, PaymentProcessorError> {
        self.prices
            .get(&plan)
            .map(String::as_str)
            .filter(|price| !price.trim().is_empty())
            .ok_or_else(PaymentProcessorError::unconfigured)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, PaymentProcessorError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|err| PaymentProcessorError::upstream(format!("invalid Stripe URL: {err}")))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.secret_key.as_str())
            .form(form)
            .send()
            .await
            .map_err(|err| PaymentProcessorError::upstream(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| PaymentProcessorError::upstream(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(|err| {
            PaymentProcessorError::upstream(format!("invalid Stripe payload: {err}"))
        })
    }
}

/// Payment-method ids are interpolated into a URL path.
fn validate_payment_method(id: &str) -> Result<&str, PaymentProcessorError> {
    let id = id.trim();
    let valid = id.starts_with("pm_")
        && id.len() <= 255
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(PaymentProcessorError::rejected("malformed payment method id"))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentProcessorError {
    let envelope = serde_json::from_slice::<ErrorEnvelopeDto>(body).ok();
    let declined = status == StatusCode::PAYMENT_REQUIRED
        || envelope.as_ref().is_some_and(|env| {
            status.is_client_error()
                && matches!(env.error.kind.as_str(), "card_error" | "invalid_request_error")
        });
    if declined {
        let message = envelope
            .and_then(|env| env.error.message)
            .unwrap_or_else(|| format!("status {}", status.as_u16()));
        return PaymentProcessorError::rejected(message);
    }
    PaymentProcessorError::upstream(status_message(status, body))
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<ProcessorSubscription, PaymentProcessorError> {
        let price = self.price_for(request.plan)?;
        let payment_method = validate_payment_method(&request.payment_method_id)?;

        let customer: CustomerDto = self
            .post_form("v1/customers", &[("email", request.email.as_ref())])
            .await?;
        debug!(customer_id = %customer.id, "stripe customer created");

        let _: serde_json::Value = self
            .post_form(
                &format!("v1/payment_methods/{payment_method}/attach"),
                &[("customer", customer.id.as_str())],
            )
            .await?;
        let _: CustomerDto = self
            .post_form(
                &format!("v1/customers/{}", customer.id),
                &[("invoice_settings[default_payment_method]", payment_method)],
            )
            .await?;
        let subscription: SubscriptionDto = self
            .post_form(
                "v1/subscriptions",
                &[
                    ("customer", customer.id.as_str()),
                    ("items[0][price]", price),
                ],
            )
            .await?;

        info!(
            customer_id = %customer.id,
            subscription_id = %subscription.id,
            plan = %request.plan,
            "stripe subscription created"
        );
        Ok(ProcessorSubscription {
            subscription_id: subscription.id,
            customer_id: customer.id,
            status: subscription.status,
        })
    }
}

/// Stand-in used when Stripe is not configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPaymentProcessor;

#[async_trait]
impl PaymentProcessor for UnconfiguredPaymentProcessor {
    async fn create_subscription(
        &self,
        _request: &SubscriptionRequest,
    ) -> Result<ProcessorSubscription, PaymentProcessorError> {
        Err(PaymentProcessorError::unconfigured())
    }
}
