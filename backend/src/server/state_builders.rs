//! Builders wiring adapters into the HTTP state.
//!
//! Repositories are Diesel-backed when a database URL is configured and
//! in-memory otherwise. Each upstream client falls back to its unconfigured
//! or fixture variant when its credentials are missing. Release builds refuse
//! the fixture identity provider and its seeded admin account.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use masseurpro::domain::ports::{
    AuthenticatedIdentity, GenerativeAi, GenerativeAiError, IdentityProvider,
    IdentityProviderError, InvitationRepository, ListingRepository, PaymentProcessor,
    PaymentProcessorError, ProcessorSubscription, Prompt, ReviewRepository, SubscriptionRequest,
    UserPersistenceError, UserRepository,
};
use masseurpro::domain::{
    AccountService, AdminService, AiPlanner, Email, ForecastService, ListingService,
    LoginCredentials, Plan, ProfileService, ReviewService, SubscriptionService,
};
use masseurpro::inbound::http::session_config::BuildMode;
use masseurpro::inbound::http::state::HttpState;
use masseurpro::outbound::genai::{GeminiClient, GeminiConfig, UnconfiguredGenerativeAi};
use masseurpro::outbound::identity::{
    FirebaseConfig, FirebaseIdentityProvider, FixtureIdentityProvider, fixture_admin_user,
};
use masseurpro::outbound::memory::{
    MemoryInvitationRepository, MemoryListingRepository, MemoryReviewRepository,
    MemoryUserRepository,
};
use masseurpro::outbound::persistence::{
    DbPool, DieselInvitationRepository, DieselListingRepository, DieselReviewRepository,
    DieselUserRepository, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};
use masseurpro::outbound::stripe::{StripeClient, StripeConfig, UnconfiguredPaymentProcessor};
use masseurpro::settings::{AppSettings, SettingsError};

/// Failures while assembling the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("database migrations failed: {0}")]
    Migrations(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    GenerativeAi(#[from] GenerativeAiError),
    #[error("failed to seed development identity: {0}")]
    Identity(#[from] IdentityProviderError),
    #[error("failed to seed development admin: {0}")]
    Seed(#[from] UserPersistenceError),
    #[error("FIREBASE_API_KEY must be set in release builds; development accounts are disabled")]
    FixtureIdentityInRelease,
}

/// Generative-AI adapter chosen at startup.
pub(crate) enum AiBackend {
    Gemini(GeminiClient),
    Unconfigured(UnconfiguredGenerativeAi),
}

#[async_trait]
impl GenerativeAi for AiBackend {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerativeAiError> {
        match self {
            Self::Gemini(client) => client.generate(prompt).await,
            Self::Unconfigured(client) => client.generate(prompt).await,
        }
    }
}

/// Identity adapter chosen at startup.
pub(crate) enum IdentityBackend {
    Firebase(FirebaseIdentityProvider),
    Fixture(FixtureIdentityProvider),
}

#[async_trait]
impl IdentityProvider for IdentityBackend {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        match self {
            Self::Firebase(provider) => provider.sign_in(credentials).await,
            Self::Fixture(provider) => provider.sign_in(credentials).await,
        }
    }

    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        match self {
            Self::Firebase(provider) => provider.sign_up(credentials).await,
            Self::Fixture(provider) => provider.sign_up(credentials).await,
        }
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError> {
        match self {
            Self::Firebase(provider) => provider.send_password_reset(email).await,
            Self::Fixture(provider) => provider.send_password_reset(email).await,
        }
    }
}

/// Payment adapter chosen at startup.
pub(crate) enum PaymentBackend {
    Stripe(StripeClient),
    Unconfigured(UnconfiguredPaymentProcessor),
}

#[async_trait]
impl PaymentProcessor for PaymentBackend {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<ProcessorSubscription, PaymentProcessorError> {
        match self {
            Self::Stripe(client) => client.create_subscription(request).await,
            Self::Unconfigured(client) => client.create_subscription(request).await,
        }
    }
}

/// Upstream clients shared by every service.
pub(crate) struct Upstreams {
    ai: Arc<AiBackend>,
    identity: Arc<IdentityBackend>,
    payments: Arc<PaymentBackend>,
}

impl Upstreams {
    pub(crate) fn from_settings(
        settings: &AppSettings,
        mode: BuildMode,
    ) -> Result<Self, StateBuildError> {
        let ai = match settings.gemini_api_key() {
            Some(key) => {
                info!(model = settings.gemini_model(), "using Gemini for AI features");
                AiBackend::Gemini(GeminiClient::new(GeminiConfig {
                    endpoint: settings.gemini_endpoint()?,
                    model: settings.gemini_model().to_owned(),
                    api_key: Zeroizing::new(key.to_owned()),
                    timeout: settings.ai_timeout(),
                })?)
            }
            None => {
                warn!("no Gemini API key configured; AI features will report unavailable");
                AiBackend::Unconfigured(UnconfiguredGenerativeAi)
            }
        };

        let identity = match settings.firebase_api_key() {
            Some(key) => IdentityBackend::Firebase(FirebaseIdentityProvider::new(FirebaseConfig {
                endpoint: settings.identity_endpoint()?,
                api_key: Zeroizing::new(key.to_owned()),
                timeout: settings.upstream_timeout(),
            })?),
            None if mode == BuildMode::Release => {
                return Err(StateBuildError::FixtureIdentityInRelease);
            }
            None => {
                warn!("no identity API key configured; using development accounts");
                IdentityBackend::Fixture(FixtureIdentityProvider::with_seeded_admin()?)
            }
        };

        let payments = match settings.stripe_secret_key() {
            Some(key) => {
                let prices: HashMap<Plan, String> = [
                    (Plan::Gold, settings.stripe_gold_price_id()),
                    (Plan::Platinum, settings.stripe_platinum_price_id()),
                ]
                .into_iter()
                .filter_map(|(plan, price)| price.map(|price| (plan, price.to_owned())))
                .collect();
                if prices.len() < 2 {
                    warn!(configured = prices.len(), "some plans have no Stripe price id");
                }
                PaymentBackend::Stripe(StripeClient::new(StripeConfig {
                    endpoint: settings.stripe_endpoint()?,
                    secret_key: Zeroizing::new(key.to_owned()),
                    prices,
                    timeout: settings.upstream_timeout(),
                })?)
            }
            None => {
                warn!("no Stripe secret key configured; subscriptions will report unavailable");
                PaymentBackend::Unconfigured(UnconfiguredPaymentProcessor)
            }
        };

        Ok(Self {
            ai: Arc::new(ai),
            identity: Arc::new(identity),
            payments: Arc::new(payments),
        })
    }
}

/// Repository set behind the services.
struct Repositories<U, R, L, V> {
    users: Arc<U>,
    reviews: Arc<R>,
    listings: Arc<L>,
    invitations: Arc<V>,
}

async fn assemble<U, R, L, V>(
    repos: Repositories<U, R, L, V>,
    upstreams: Upstreams,
) -> Result<HttpState, StateBuildError>
where
    U: UserRepository + 'static,
    R: ReviewRepository + 'static,
    L: ListingRepository + 'static,
    V: InvitationRepository + 'static,
{
    let Repositories {
        users,
        reviews,
        listings,
        invitations,
    } = repos;
    let Upstreams {
        ai,
        identity,
        payments,
    } = upstreams;

    if matches!(identity.as_ref(), IdentityBackend::Fixture(_)) {
        let admin = fixture_admin_user()?;
        if users.insert_if_absent(&admin).await? {
            info!(user_id = %admin.id(), "seeded development admin");
        }
    }

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let listing_service = Arc::new(ListingService::new(
        Arc::clone(&users),
        listings,
        Arc::clone(&clock),
    ));
    let admin_service = Arc::new(AdminService::new(
        Arc::clone(&users),
        invitations,
        Arc::clone(&clock),
    ));

    Ok(HttpState {
        login: Arc::new(AccountService::new(Arc::clone(&users), identity)),
        accounts: Arc::new(ProfileService::new(Arc::clone(&users), Arc::clone(&reviews))),
        reviews: Arc::new(ReviewService::new(Arc::clone(&users), reviews, clock)),
        listings: listing_service.clone(),
        listings_query: listing_service,
        forecasts: Arc::new(ForecastService::new(Arc::clone(&ai))),
        planner: Arc::new(AiPlanner::new(Arc::clone(&users), ai)),
        subscriptions: Arc::new(SubscriptionService::new(users, payments)),
        admin: admin_service.clone(),
        admin_query: admin_service,
    })
}

/// Build the HTTP state from settings, migrating the database when one is
/// configured.
pub(crate) async fn build_http_state(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<HttpState, StateBuildError> {
    let upstreams = Upstreams::from_settings(settings, mode)?;

    match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url).await?;
            let mut pool_config = PoolConfig::new(url);
            if let Some(max) = settings.db_max_connections {
                pool_config = pool_config.with_max_size(max);
            }
            let pool = DbPool::new(pool_config).await?;
            info!("using PostgreSQL persistence");
            assemble(
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
                    listings: Arc::new(DieselListingRepository::new(pool.clone())),
                    invitations: Arc::new(DieselInvitationRepository::new(pool)),
                },
                upstreams,
            )
            .await
        }
        None => {
            warn!("no database URL configured; state is kept in memory and lost on restart");
            assemble(
                Repositories {
                    users: Arc::new(MemoryUserRepository::default()),
                    reviews: Arc::new(MemoryReviewRepository::default()),
                    listings: Arc::new(MemoryListingRepository::default()),
                    invitations: Arc::new(MemoryInvitationRepository::default()),
                },
                upstreams,
            )
            .await
        }
    }
}
