//! Account use-cases: sign-in, registration, the caller's own account and
//! public profiles.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::ports::{
    AccountQuery, IdentityProvider, IdentityProviderError, LoginService, ReviewRepository,
    ReviewRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Error, FeatureSet, LoginCredentials, Review, ReviewSummary, Role, Tier, User, UserId,
    aggregate, can_review, resolve_access,
};

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

pub(crate) fn map_review_repository_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
    }
}

fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidCredentials => Error::unauthorized("invalid credentials"),
        IdentityProviderError::EmailTaken => Error::conflict("email already registered"),
        IdentityProviderError::WeakPassword { message } => Error::invalid_request(message)
            .with_details(serde_json::json!({ "field": "password", "code": "weak_password" })),
        other @ (IdentityProviderError::Upstream { .. } | IdentityProviderError::Decode { .. }) => {
            Error::service_unavailable(other.to_string())
        }
    }
}

/// Load the record behind a verified session.
///
/// A session whose user record has disappeared is treated as signed out.
pub(crate) async fn load_caller<U>(users: &U, caller: &UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(caller)
        .await
        .map_err(map_user_persistence_error)?
        .ok_or_else(|| Error::unauthorized("login required"))
}

/// Load the caller and resolve their entitlements.
pub(crate) async fn load_caller_features<U>(
    users: &U,
    caller: &UserId,
) -> Result<(User, FeatureSet), Error>
where
    U: UserRepository + ?Sized,
{
    let user = load_caller(users, caller).await?;
    let features = resolve_access(user.tier(), user.role());
    Ok((user, features))
}

/// The signed-in user's own account.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Stored account record.
    pub user: User,
    /// Tier after the admin override.
    pub effective_tier: Tier,
    /// Features unlocked by the effective tier and role.
    pub features: FeatureSet,
}

impl From<User> for AccountView {
    fn from(user: User) -> Self {
        let features = resolve_access(user.tier(), user.role());
        Self {
            effective_tier: user.effective_tier(),
            features,
            user,
        }
    }
}

/// Public profile with its reputation aggregate.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub role: Role,
    pub tier: Tier,
    pub summary: ReviewSummary,
    pub reviews: Vec<Review>,
    /// Whether the viewer may leave a review.
    pub can_review: bool,
}

/// Sign-in and registration backed by the identity provider.
#[derive(Clone)]
pub struct AccountService<U, I> {
    users: Arc<U>,
    identity: Arc<I>,
}

impl<U, I> AccountService<U, I> {
    /// Create the service over the user store and identity provider.
    pub fn new(users: Arc<U>, identity: Arc<I>) -> Self {
        Self { users, identity }
    }
}

impl<U, I> AccountService<U, I>
where
    U: UserRepository,
{
    async fn ensure_record(&self, user: User) -> Result<User, Error> {
        let created = self
            .users
            .insert_if_absent(&user)
            .await
            .map_err(map_user_persistence_error)?;
        if created {
            info!(user_id = %user.id(), "created user record on first sign-in");
            return Ok(user);
        }
        self.users
            .find_by_id(user.id())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::internal("user record vanished after sign-in"))
    }
}

#[async_trait]
impl<U, I> LoginService for AccountService<U, I>
where
    U: UserRepository,
    I: IdentityProvider,
{
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let identity = self
            .identity
            .sign_in(credentials)
            .await
            .map_err(map_identity_error)?;
        self.ensure_record(User::first_sign_in(identity.uid, identity.email))
            .await
    }

    async fn sign_up(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        credentials.ensure_new_password_policy().map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(serde_json::json!({ "field": "password", "code": "weak_password" }))
        })?;
        let identity = self
            .identity
            .sign_up(credentials)
            .await
            .map_err(map_identity_error)?;
        self.ensure_record(User::first_sign_in(identity.uid, identity.email))
            .await
    }

    async fn request_password_reset(&self, email: &Email) -> Result<(), Error> {
        match self.identity.send_password_reset(email).await {
            Ok(()) => {
                info!("password reset email requested");
                Ok(())
            }
            Err(IdentityProviderError::InvalidCredentials) => {
                debug!("password reset requested for an unknown account");
                Ok(())
            }
            Err(err) => Err(map_identity_error(err)),
        }
    }
}

/// Read-side account and profile queries.
#[derive(Clone)]
pub struct ProfileService<U, R> {
    users: Arc<U>,
    reviews: Arc<R>,
}

impl<U, R> ProfileService<U, R> {
    pub fn new(users: Arc<U>, reviews: Arc<R>) -> Self {
        Self { users, reviews }
    }
}

#[async_trait]
impl<U, R> AccountQuery for ProfileService<U, R>
where
    U: UserRepository,
    R: ReviewRepository,
{
    async fn current_account(&self, user_id: &UserId) -> Result<AccountView, Error> {
        load_caller(self.users.as_ref(), user_id)
            .await
            .map(AccountView::from)
    }

    async fn profile(
        &self,
        viewer: Option<&UserId>,
        user_id: &UserId,
    ) -> Result<ProfileView, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        let reviews = self
            .reviews
            .list_for_reviewee(user_id)
            .await
            .map_err(map_review_repository_error)?;

        Ok(ProfileView {
            user_id: user.id().clone(),
            role: user.role(),
            tier: user.effective_tier(),
            summary: aggregate(&reviews),
            can_review: can_review(viewer, user_id, &reviews),
            reviews,
        })
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
