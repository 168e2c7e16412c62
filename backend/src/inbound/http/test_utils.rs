//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use crate::domain::ports::{
    GenerativeAi, GenerativeAiError, OutputFormat, PaymentProcessor, PaymentProcessorError,
    ProcessorSubscription, Prompt, SubscriptionRequest, UserRepository,
};
use crate::domain::{
    AccountService, AdminService, AiPlanner, ForecastService, ListingService, ProfileService,
    ReviewService, Role, SubscriptionService, Tier, UserId,
};
use crate::inbound::http::api_routes;
use crate::inbound::http::state::HttpState;
use crate::outbound::identity::{FixtureIdentityProvider, fixture_admin_user};
use crate::outbound::memory::{
    MemoryInvitationRepository, MemoryListingRepository, MemoryReviewRepository,
    MemoryUserRepository,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Model stand-in answering every prompt with a fixed, well-formed reply.
pub struct CannedAi;

#[async_trait]
impl GenerativeAi for CannedAi {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerativeAiError> {
        let answer = match prompt.format {
            OutputFormat::Json if prompt.text.contains("predicting the demand") => {
                json!({ "demandScore": 82, "reasoning": "Pride month" }).to_string()
            }
            OutputFormat::Json => json!({
                "suggestedRate": 190,
                "expectedBookings": 14,
                "projectedRevenue": 2660,
                "reasoning": "High season",
            })
            .to_string(),
            OutputFormat::Text => "Day 1: arrive and settle in".to_owned(),
        };
        Ok(answer)
    }
}

/// Payment processor stand-in that accepts every request.
pub struct AcceptingPayments;

#[async_trait]
impl PaymentProcessor for AcceptingPayments {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<ProcessorSubscription, PaymentProcessorError> {
        Ok(ProcessorSubscription {
            subscription_id: format!("sub_{}", request.plan),
            customer_id: "cus_test".to_owned(),
            status: "active".to_owned(),
        })
    }
}

/// Application wired to in-memory adapters, with the fixture admin seeded.
pub struct TestHarness {
    pub users: Arc<MemoryUserRepository>,
    pub state: HttpState,
}

impl TestHarness {
    pub fn new() -> Self {
        let admin = fixture_admin_user().expect("fixture admin");
        let users = Arc::new(MemoryUserRepository::seeded([admin]));
        let reviews = Arc::new(MemoryReviewRepository::default());
        let listings = Arc::new(MemoryListingRepository::default());
        let invitations = Arc::new(MemoryInvitationRepository::default());
        let identity = Arc::new(FixtureIdentityProvider::with_seeded_admin().expect("identity"));
        let ai = Arc::new(CannedAi);
        let payments = Arc::new(AcceptingPayments);
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

        let listing_service = Arc::new(ListingService::new(
            Arc::clone(&users),
            listings,
            clock.clone(),
        ));
        let admin_service = Arc::new(AdminService::new(
            Arc::clone(&users),
            invitations,
            clock.clone(),
        ));
        let state = HttpState {
            login: Arc::new(AccountService::new(Arc::clone(&users), identity)),
            accounts: Arc::new(ProfileService::new(Arc::clone(&users), Arc::clone(&reviews))),
            reviews: Arc::new(ReviewService::new(Arc::clone(&users), reviews, clock)),
            listings: listing_service.clone(),
            listings_query: listing_service,
            forecasts: Arc::new(ForecastService::new(Arc::clone(&ai))),
            planner: Arc::new(AiPlanner::new(Arc::clone(&users), ai)),
            subscriptions: Arc::new(SubscriptionService::new(Arc::clone(&users), payments)),
            admin: admin_service.clone(),
            admin_query: admin_service,
        };
        Self { users, state }
    }

    /// Application serving the `/api/v1` scope.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new().app_data(web::Data::new(self.state.clone())).service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(api_routes),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Register `email`, then give the new account `tier` and `role`.
///
/// Returns the session cookie and the new user's id.
pub async fn sign_up_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    harness: &TestHarness,
    email: &str,
    tier: Tier,
    role: Role,
) -> (Cookie<'static>, UserId) {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": email, "password": "secret1" }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "signup failed: {}", res.status());
    let cookie = session_cookie(&res).expect("session cookie");
    let body: Value = test::read_body_json(res).await;
    let id = body["user"]["id"].as_str().expect("user id");
    let id = UserId::new(id).expect("valid user id");
    harness
        .users
        .update_access(&id, tier, role)
        .await
        .expect("update access");
    (cookie, id)
}
