//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local repositories for development and tests
//! - **genai**: Gemini client for the generative-AI port
//! - **stripe**: Stripe client for the payment-processor port
//! - **identity**: Identity Toolkit client and a fixture provider
//!
//! Adapters translate between domain types and transport representations.
//! They contain no business logic.

mod http_preview;

pub mod genai;
pub mod identity;
pub mod memory;
pub mod persistence;
pub mod stripe;
