//! PostgreSQL-backed `ListingRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{ListingRecord, ServiceListing, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::ListingRow;
use super::pool::{DbPool, PoolError};
use super::schema::service_listings;

/// Diesel implementation of [`ListingRepository`].
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListingRepositoryError {
    map_basic_pool_error(error, ListingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_basic_diesel_error(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

fn listing_to_row(listing: &ServiceListing) -> ListingRow {
    ListingRow {
        id: listing.id(),
        provider_id: listing.provider_id().to_string(),
        service_type: listing.service_type().as_str().to_owned(),
        description: listing.description().to_owned(),
        rate: listing.rate(),
        location: listing.location().to_owned(),
        instagram_url: listing.instagram_url().map(str::to_owned),
        image_url: listing.image_url().map(str::to_owned),
        created_at: listing.created_at(),
    }
}

fn row_to_listing(row: ListingRow) -> Result<ServiceListing, ListingRepositoryError> {
    let provider_id = UserId::new(row.provider_id).map_err(|err| {
        ListingRepositoryError::query(format!("stored provider id is invalid: {err}"))
    })?;
    ServiceListing::try_from(ListingRecord {
        id: row.id,
        provider_id,
        service_type: row.service_type,
        description: row.description,
        rate: row.rate,
        location: row.location,
        instagram_url: row.instagram_url,
        image_url: row.image_url,
        created_at: row.created_at,
    })
    .map_err(|err| ListingRepositoryError::query(format!("stored listing is invalid: {err}")))
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &ServiceListing) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(service_listings::table)
            .values(&listing_to_row(listing))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<ServiceListing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ListingRow> = service_listings::table
            .order(service_listings::created_at.desc())
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_listing).collect()
    }
}
