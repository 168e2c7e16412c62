//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    AccountQuery, AdminCommand, AdminQuery, ForecastQuery, ListingCommand, ListingQuery,
    LoginService, PlannerService, ReviewCommand, SubscriptionCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountQuery>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub listings: Arc<dyn ListingCommand>,
    pub listings_query: Arc<dyn ListingQuery>,
    pub forecasts: Arc<dyn ForecastQuery>,
    pub planner: Arc<dyn PlannerService>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub admin: Arc<dyn AdminCommand>,
    pub admin_query: Arc<dyn AdminQuery>,
}
