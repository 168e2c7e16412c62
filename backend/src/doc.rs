//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler, the health probes and the
//! payload schemas. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AccountStatus, AccountView, AdminStats, CompetitorSnapshot, DemandLevel, Error, ErrorCode,
    FeatureSet, Forecast, Invitation, InvitationDraft, Itinerary, ItineraryRequest, ListingDraft,
    Plan, PricingRequest, PricingSuggestion, ProfileView, Review, ReviewSummary, RoadTripRequest,
    Role, Saturation, Season, ServiceListing, ServiceType, SubscriptionReceipt, Tier, TravelMode,
    User,
};
use crate::inbound::http::admin::AccessUpdateRequest;
use crate::inbound::http::auth::{CredentialsRequest, PasswordResetRequest};
use crate::inbound::http::subscriptions::SubscriptionRequest;
use crate::inbound::http::users::{ReviewCreated, ReviewRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or /api/v1/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the MasseurPro REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "MasseurPro API",
        description = "Tiered accounts, reviews, listings, market forecasts, \
                       AI planning, billing and administration for travelling \
                       massage professionals."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::password_reset,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::user_profile,
        crate::inbound::http::users::submit_review,
        crate::inbound::http::listings::list_listings,
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::forecasts::list_forecasts,
        crate::inbound::http::planner::suggest_pricing,
        crate::inbound::http::planner::plan_itinerary,
        crate::inbound::http::planner::plan_road_trip,
        crate::inbound::http::subscriptions::create_subscription,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::stats,
        crate::inbound::http::admin::update_access,
        crate::inbound::http::admin::create_invitation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Tier,
        AccountStatus,
        AccountView,
        FeatureSet,
        ProfileView,
        Review,
        ReviewSummary,
        ReviewRequest,
        ReviewCreated,
        ServiceType,
        ServiceListing,
        ListingDraft,
        Forecast,
        DemandLevel,
        Season,
        Saturation,
        CompetitorSnapshot,
        PricingRequest,
        PricingSuggestion,
        ItineraryRequest,
        RoadTripRequest,
        TravelMode,
        Itinerary,
        Plan,
        SubscriptionRequest,
        SubscriptionReceipt,
        AdminStats,
        AccessUpdateRequest,
        InvitationDraft,
        Invitation,
        CredentialsRequest,
        PasswordResetRequest,
    )),
    tags(
        (name = "accounts", description = "Sign-up, login, password reset and the caller's account"),
        (name = "reviews", description = "Public profiles and peer reviews"),
        (name = "listings", description = "Provider service listings"),
        (name = "forecasts", description = "Per-city demand forecasts"),
        (name = "planner", description = "AI pricing and trip planning"),
        (name = "billing", description = "Paid subscriptions"),
        (name = "admin", description = "Administrator-only operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
