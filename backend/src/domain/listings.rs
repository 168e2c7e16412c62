//! Service marketplace listings.
//!
//! Providers publish a [`ServiceListing`] under their own user id. The
//! marketplace shows every listing, newest first.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::accounts::load_caller;
use crate::domain::ports::{
    ListingCommand, ListingQuery, ListingRepository, ListingRepositoryError, UserRepository,
};
use crate::domain::{Error, UserId};

pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 500;
pub const LOCATION_MIN: usize = 3;
pub const RATE_MIN: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("unknown service type '{0}'")]
    UnknownServiceType(String),
    #[error("description must be between {min} and {max} characters")]
    Description { min: usize, max: usize },
    #[error("rate must be a number of at least {min}")]
    Rate { min: f64 },
    #[error("location must be at least {min} characters")]
    Location { min: usize },
    #[error("{field} must be an http(s) URL")]
    Url { field: &'static str },
}

impl ListingValidationError {
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UnknownServiceType(_) => "serviceType",
            Self::Description { .. } => "description",
            Self::Rate { .. } => "rate",
            Self::Location { .. } => "location",
            Self::Url { field } => *field,
        }
    }
}

/// Kind of service offered on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Barber,
    HairStylist,
    ManicurePedicure,
    FitnessTraining,
    MealPrep,
}

impl ServiceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barber => "barber",
            Self::HairStylist => "hair-stylist",
            Self::ManicurePedicure => "manicure-pedicure",
            Self::FitnessTraining => "fitness-training",
            Self::MealPrep => "meal-prep",
        }
    }
}

impl FromStr for ServiceType {
    type Err = ListingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "barber" => Ok(Self::Barber),
            "hair-stylist" => Ok(Self::HairStylist),
            "manicure-pedicure" => Ok(Self::ManicurePedicure),
            "fitness-training" => Ok(Self::FitnessTraining),
            "meal-prep" => Ok(Self::MealPrep),
            _ => Err(ListingValidationError::UnknownServiceType(s.to_owned())),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing fields as submitted by a provider.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[schema(example = "barber")]
    pub service_type: String,
    pub description: String,
    #[schema(example = 60.0)]
    pub rate: f64,
    #[schema(example = "Chelsea, New York")]
    pub location: String,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Raw listing fields, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: Uuid,
    pub provider_id: UserId,
    pub service_type: String,
    pub description: String,
    pub rate: f64,
    pub location: String,
    pub instagram_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated marketplace listing.
///
/// ## Invariants
/// - `description` is 20 to 500 characters after trimming.
/// - `rate` is finite and at least 1.
/// - Optional links are absolute http(s) URLs.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    id: Uuid,
    #[schema(value_type = String)]
    provider_id: UserId,
    service_type: ServiceType,
    description: String,
    rate: f64,
    location: String,
    instagram_url: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

fn validate_url(
    raw: Option<String>,
    field: &'static str,
) -> Result<Option<String>, ListingValidationError> {
    let Some(raw) = raw.map(|value| value.trim().to_owned()) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(raw)),
        _ => Err(ListingValidationError::Url { field }),
    }
}

impl TryFrom<ListingRecord> for ServiceListing {
    type Error = ListingValidationError;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        let service_type = record.service_type.parse()?;
        let description = record.description.trim().to_owned();
        let length = description.chars().count();
        if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&length) {
            return Err(ListingValidationError::Description {
                min: DESCRIPTION_MIN,
                max: DESCRIPTION_MAX,
            });
        }
        if !record.rate.is_finite() || record.rate < RATE_MIN {
            return Err(ListingValidationError::Rate { min: RATE_MIN });
        }
        let location = record.location.trim().to_owned();
        if location.chars().count() < LOCATION_MIN {
            return Err(ListingValidationError::Location { min: LOCATION_MIN });
        }
        Ok(Self {
            id: record.id,
            provider_id: record.provider_id,
            service_type,
            description,
            rate: record.rate,
            location,
            instagram_url: validate_url(record.instagram_url, "instagramUrl")?,
            image_url: validate_url(record.image_url, "imageUrl")?,
            created_at: record.created_at,
        })
    }
}

impl ServiceListing {
    /// Validate a provider's draft into a new listing.
    pub fn create(
        id: Uuid,
        provider_id: UserId,
        draft: ListingDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ListingValidationError> {
        ListingRecord {
            id,
            provider_id,
            service_type: draft.service_type,
            description: draft.description,
            rate: draft.rate,
            location: draft.location,
            instagram_url: draft.instagram_url,
            image_url: draft.image_url,
            created_at,
        }
        .try_into()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provider_id(&self) -> &UserId {
        &self.provider_id
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn instagram_url(&self) -> Option<&str> {
        self.instagram_url.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn map_listing_repository_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
    }
}

/// Marketplace service implementing [`ListingCommand`] and [`ListingQuery`].
#[derive(Clone)]
pub struct ListingService<U, L> {
    users: Arc<U>,
    listings: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<U, L> ListingService<U, L> {
    pub fn new(users: Arc<U>, listings: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            listings,
            clock,
        }
    }
}

#[async_trait]
impl<U, L> ListingCommand for ListingService<U, L>
where
    U: UserRepository,
    L: ListingRepository,
{
    async fn create_listing(
        &self,
        provider: &UserId,
        draft: ListingDraft,
    ) -> Result<ServiceListing, Error> {
        let listing = ServiceListing::create(
            Uuid::new_v4(),
            provider.clone(),
            draft,
            self.clock.utc(),
        )
        .map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
        })?;
        load_caller(self.users.as_ref(), provider).await?;

        self.listings
            .insert(&listing)
            .await
            .map_err(map_listing_repository_error)?;
        info!(
            user_id = %provider,
            listing_id = %listing.id(),
            service_type = %listing.service_type(),
            "listing published"
        );
        Ok(listing)
    }
}

#[async_trait]
impl<U, L> ListingQuery for ListingService<U, L>
where
    U: UserRepository,
    L: ListingRepository,
{
    async fn list_listings(&self) -> Result<Vec<ServiceListing>, Error> {
        self.listings
            .list_newest_first()
            .await
            .map_err(map_listing_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockListingRepository, MockUserRepository};
    use crate::domain::{Email, User};
    use chrono::TimeZone;
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn provider() -> UserId {
        UserId::new("provider-1").expect("uid")
    }

    #[fixture]
    fn draft() -> ListingDraft {
        ListingDraft {
            service_type: "hair-stylist".to_owned(),
            description: "Cuts and colour for travelling clients.".to_owned(),
            rate: 75.0,
            location: "Castro District".to_owned(),
            instagram_url: Some("https://instagram.com/stylist".to_owned()),
            image_url: Some("  ".to_owned()),
        }
    }

    fn service(
        users: MockUserRepository,
        listings: MockListingRepository,
    ) -> ListingService<MockUserRepository, MockListingRepository> {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(now);
        ListingService::new(Arc::new(users), Arc::new(listings), Arc::new(clock))
    }

    #[rstest]
    fn accepts_a_valid_draft(draft: ListingDraft) {
        let listing = ServiceListing::create(Uuid::nil(), provider(), draft, now()).expect("valid");
        assert_eq!(listing.service_type(), ServiceType::HairStylist);
        assert_eq!(listing.image_url(), None);
        assert_eq!(listing.instagram_url(), Some("https://instagram.com/stylist"));
    }

    #[rstest]
    #[case::short_description(|d: &mut ListingDraft| d.description = "a".repeat(19), "description")]
    #[case::long_description(|d: &mut ListingDraft| d.description = "a".repeat(501), "description")]
    #[case::zero_rate(|d: &mut ListingDraft| d.rate = 0.5, "rate")]
    #[case::nan_rate(|d: &mut ListingDraft| d.rate = f64::NAN, "rate")]
    #[case::short_location(|d: &mut ListingDraft| d.location = "NY".to_owned(), "location")]
    #[case::unknown_type(|d: &mut ListingDraft| d.service_type = "massage".to_owned(), "serviceType")]
    #[case::bad_link(|d: &mut ListingDraft| d.image_url = Some("ftp://x.y/z.png".to_owned()), "imageUrl")]
    fn rejects_invalid_fields(
        mut draft: ListingDraft,
        #[case] mutate: fn(&mut ListingDraft),
        #[case] field: &str,
    ) {
        mutate(&mut draft);
        let err = ServiceListing::create(Uuid::nil(), provider(), draft, now())
            .expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[tokio::test]
    async fn publishes_under_the_session_user(draft: ListingDraft) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(User::first_sign_in(
                id.clone(),
                Email::new("p@example.com").expect("email"),
            )))
        });
        let mut listings = MockListingRepository::new();
        listings
            .expect_insert()
            .withf(|listing| {
                listing.provider_id().as_ref() == "provider-1" && listing.created_at() == now()
            })
            .times(1)
            .return_once(|_| Ok(()));

        let listing = service(users, listings)
            .create_listing(&provider(), draft)
            .await
            .expect("published");
        assert_eq!(listing.provider_id(), &provider());
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_draft_never_reaches_storage(mut draft: ListingDraft) {
        draft.rate = -3.0;
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        let mut listings = MockListingRepository::new();
        listings.expect_insert().never();

        let err = service(users, listings)
            .create_listing(&provider(), draft)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_failures_map_to_unavailable() {
        let mut listings = MockListingRepository::new();
        listings
            .expect_list_newest_first()
            .return_once(|| Err(ListingRepositoryError::connection("refused")));

        let err = service(MockUserRepository::new(), listings)
            .list_listings()
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
