//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: keep business rules (entitlements, review guarding, the admin
//! gate, pricing and planning) independent of HTTP and storage. Services are
//! generic over the driven ports in [`ports`] and implement the driving ports
//! consumed by inbound adapters.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserId, Role, Tier: identity and access.
//! - FeatureSet / resolve_access: the entitlement resolver.
//! - Review types with aggregate / can_review: reputation.

pub(crate) mod accounts;
pub mod admin;
pub mod auth;
pub mod billing;
pub mod entitlements;
pub mod error;
pub mod forecast_service;
pub mod invitations;
pub mod listings;
pub mod market;
pub mod planner;
pub mod ports;
pub mod prompts;
pub mod review_service;
pub mod reviews;
pub mod trace_id;
pub mod user;

pub use self::accounts::{AccountService, AccountView, ProfileService, ProfileView};
pub use self::admin::{AdminService, AdminStats, authorize_access_change};
pub use self::auth::{LoginCredentials, LoginValidationError, NEW_PASSWORD_MIN};
pub use self::billing::{Plan, SubscriptionReceipt, SubscriptionService, UnknownPlan};
pub use self::entitlements::{Feature, FeatureSet, resolve_access};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::forecast_service::ForecastService;
pub use self::invitations::{
    INVITE_CODE_LEN, Invitation, InvitationDraft, InvitationValidationError, InviteCode,
    signup_link,
};
pub use self::listings::{
    ListingDraft, ListingRecord, ListingService, ListingValidationError, ServiceListing,
    ServiceType,
};
pub use self::market::{
    CITIES, City, CompetitorSnapshot, DemandLevel, Forecast, SEASONS, Saturation, Season,
    fallback_demand_score, find_city, season_for,
};
pub use self::planner::{
    AiPlanner, Itinerary, ItineraryRequest, PricingRequest, PricingSuggestion, RoadTripRequest,
    TravelMode,
};
pub use self::review_service::ReviewService;
pub use self::reviews::{
    COMMENT_MAX, COMMENT_MIN, Rating, Review, ReviewComment, ReviewDraft, ReviewId,
    ReviewSubmission, ReviewSummary, ReviewValidationError, StoredReviewError, aggregate,
    can_review,
};
pub use self::trace_id::TraceId;
pub use self::user::{AccountStatus, Email, Role, Tier, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use masseurpro::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
