//! Port for marketplace listing persistence.
use async_trait::async_trait;

use crate::domain::ServiceListing;

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a new listing.
    async fn insert(&self, listing: &ServiceListing) -> Result<(), ListingRepositoryError>;

    /// Every listing, most recently created first.
    async fn list_newest_first(&self) -> Result<Vec<ServiceListing>, ListingRepositoryError>;
}
