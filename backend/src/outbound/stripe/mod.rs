//! Payment processor outbound adapters.

mod dto;
mod stripe_client;

pub use stripe_client::{StripeClient, StripeConfig, UnconfiguredPaymentProcessor};
