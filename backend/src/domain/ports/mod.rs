//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, identity, AI, payments) are implemented by
//! outbound adapters. Driving ports are implemented by domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod admin_ports;
mod forecast_query;
mod generative_ai;
mod identity_provider;
mod invitation_repository;
mod listing_ports;
mod listing_repository;
mod login_service;
mod payment_processor;
mod planner_service;
mod review_command;
mod review_repository;
mod subscription_command;
mod user_repository;

pub use account_query::AccountQuery;
pub use admin_ports::{AdminCommand, AdminQuery};
pub use forecast_query::ForecastQuery;
#[cfg(test)]
pub use generative_ai::MockGenerativeAi;
pub use generative_ai::{GenerativeAi, GenerativeAiError, OutputFormat, Prompt};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{AuthenticatedIdentity, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use invitation_repository::MockInvitationRepository;
pub use invitation_repository::{InvitationRepository, InvitationRepositoryError};
pub use listing_ports::{ListingCommand, ListingQuery};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use payment_processor::MockPaymentProcessor;
pub use payment_processor::{
    PaymentProcessor, PaymentProcessorError, ProcessorSubscription, SubscriptionRequest,
};
pub use planner_service::PlannerService;
pub use review_command::ReviewCommand;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
pub use subscription_command::SubscriptionCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
