//! Sign-in, registration and logout handlers.
//!
//! ```text
//! POST /api/v1/login  {"email":"sam@example.com","password":"secret1"}
//! POST /api/v1/signup {"email":"sam@example.com","password":"secret1"}
//! POST /api/v1/logout
//! POST /api/v1/password-reset {"email":"sam@example.com"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AccountView, Email, Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Email/password body shared by login and sign-up.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[schema(example = "sam@example.com")]
    pub email: String,
    pub password: String,
}

/// Body for a password reset request.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[schema(example = "sam@example.com")]
    pub email: String,
}

fn credentials(payload: CredentialsRequest) -> Result<LoginCredentials, Error> {
    LoginCredentials::try_from_parts(&payload.email, &payload.password).map_err(|err| {
        let (field, code) = match err {
            LoginValidationError::InvalidEmail => ("email", "invalid_email"),
            LoginValidationError::EmptyPassword => ("password", "empty_password"),
            LoginValidationError::PasswordTooShort { .. } => ("password", "weak_password"),
        };
        Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
    })
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = AccountView,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<AccountView>> {
    let credentials = credentials(payload.into_inner())?;
    let user = state.login.sign_in(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(AccountView::from(user)))
}

/// Register a new account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = AccountView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload.into_inner())?;
    let user = state.login.sign_up(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(AccountView::from(user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Ask the identity provider to email a password reset link.
///
/// Unknown addresses answer the same as known ones so the endpoint cannot be
/// used to enumerate accounts.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 204, description = "Reset email requested"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-reset")]
pub async fn password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    let email = Email::new(payload.into_inner().email).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" }))
    })?;
    state.login.request_password_reset(&email).await?;
    Ok(HttpResponse::NoContent().finish())
}
