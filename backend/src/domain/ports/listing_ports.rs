//! Driving ports for the service marketplace.
use async_trait::async_trait;

use crate::domain::{Error, ListingDraft, ServiceListing, UserId};

#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Publish a listing owned by `provider`.
    async fn create_listing(
        &self,
        provider: &UserId,
        draft: ListingDraft,
    ) -> Result<ServiceListing, Error>;
}

#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// All listings, newest first.
    async fn list_listings(&self) -> Result<Vec<ServiceListing>, Error>;
}
