//! Account and profile handlers.
//!
//! ```text
//! GET  /api/v1/users/me
//! GET  /api/v1/users/{id}/profile
//! POST /api/v1/users/{id}/reviews {"rating":5,"comment":"Great hands, on time."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AccountView, Error, ProfileView, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Parse a user id taken from the request path.
pub(crate) fn path_user_id(raw: String) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_user_id" }))
    })
}

/// Review body. The reviewer is always the session user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReviewRequest {
    #[schema(example = 5)]
    pub rating: i64,
    #[schema(example = "Great hands, on time and professional.")]
    pub comment: String,
}

/// Identifier of a stored review.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewCreated {
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub id: String,
}

/// Return the signed-in account with its resolved feature flags.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current account", body = AccountView),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountView>> {
    let user_id = session.require_user_id()?;
    let account = state.accounts.current_account(&user_id).await?;
    Ok(web::Json(account))
}

/// Public profile with review summary.
///
/// Anonymous viewers get the profile with `canReview` false.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/profile",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "userProfile",
    security([], ("SessionCookie" = []))
)]
#[get("/users/{id}/profile")]
pub async fn user_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileView>> {
    let user_id = path_user_id(path.into_inner())?;
    let viewer = session.user_id()?;
    let profile = state.accounts.profile(viewer.as_ref(), &user_id).await?;
    Ok(web::Json(profile))
}

/// Review another user. One review per reviewer and reviewee.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/reviews",
    params(("id" = String, Path, description = "Reviewee user id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewCreated),
        (status = 400, description = "Invalid review", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown reviewee", body = Error),
        (status = 409, description = "Already reviewed", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "submitReview",
    security(("SessionCookie" = []))
)]
#[post("/users/{id}/reviews")]
pub async fn submit_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let reviewer = session.require_user_id()?;
    let reviewee = path_user_id(path.into_inner())?;
    let ReviewRequest { rating, comment } = payload.into_inner();
    let id = state
        .reviews
        .submit_review(&reviewer, &reviewee, rating, &comment)
        .await?;
    Ok(HttpResponse::Created().json(ReviewCreated {
        id: id.as_ref().to_owned(),
    }))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
