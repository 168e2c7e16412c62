//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversion into domain
//! types revalidates every field so a hand-edited row cannot smuggle an
//! invalid value into the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{invitations, reviews, service_listings, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub tier: String,
    pub status: String,
    pub revenue: f64,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub tier: &'a str,
    pub status: &'a str,
    pub revenue: f64,
}

/// Partial update touching only tier and role.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserAccessUpdate<'a> {
    pub tier: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: &'a str,
    pub reviewer_id: &'a str,
    pub reviewee_id: &'a str,
    pub rating: i16,
    pub comment: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub provider_id: String,
    pub service_type: String,
    pub description: String,
    pub rate: f64,
    pub location: String,
    pub instagram_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub code: &'a str,
    pub email: &'a str,
    pub tier: &'a str,
    pub coupon_code: Option<&'a str>,
    pub discount_percentage: Option<i16>,
    pub created_by: &'a str,
    pub created_at: DateTime<Utc>,
}
