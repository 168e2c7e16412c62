//! Wire shapes for the Stripe REST API subset used by subscriptions.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct CustomerDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SubscriptionDto {
    pub(super) id: String,
    pub(super) status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(rename = "type", default)]
    pub(super) kind: String,
    #[serde(default)]
    pub(super) message: Option<String>,
}
