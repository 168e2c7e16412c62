//! Admin panel handlers.
//!
//! Every handler passes the session user id to the domain, which re-reads
//! the caller's stored role before doing anything else.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AdminStats, Error, Invitation, InvitationDraft, Role, Tier, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::path_user_id;

/// New tier and role for a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AccessUpdateRequest {
    #[schema(example = "gold")]
    pub tier: String,
    #[schema(example = "provider")]
    pub role: String,
}

impl AccessUpdateRequest {
    fn parse(&self) -> Result<(Tier, Role), Error> {
        let invalid = |field: &str, err: &dyn std::fmt::Display| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
        };
        let tier = self
            .tier
            .parse::<Tier>()
            .map_err(|err| invalid("tier", &err))?;
        let role = self
            .role
            .parse::<Role>()
            .map_err(|err| invalid("role", &err))?;
        Ok((tier, role))
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All users ordered by email", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers",
    security(("SessionCookie" = []))
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let caller = session.require_user_id()?;
    let users = state.admin_query.list_users(&caller).await?;
    Ok(web::Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = AdminStats),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats",
    security(("SessionCookie" = []))
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AdminStats>> {
    let caller = session.require_user_id()?;
    let stats = state.admin_query.stats(&caller).await?;
    Ok(web::Json(stats))
}

/// Overwrite a user's tier and role.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/access",
    params(("id" = String, Path, description = "Target user id")),
    request_body = AccessUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid tier or role", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateAccess",
    security(("SessionCookie" = []))
)]
#[put("/admin/users/{id}/access")]
pub async fn update_access(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AccessUpdateRequest>,
) -> ApiResult<web::Json<User>> {
    let caller = session.require_user_id()?;
    let target = path_user_id(path.into_inner())?;
    let (tier, role) = payload.parse()?;
    let user = state
        .admin
        .update_user_tier_and_role(&caller, &target, tier, role)
        .await?;
    Ok(web::Json(user))
}

/// Issue a sign-up invitation with an optional coupon.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invitations",
    request_body = InvitationDraft,
    responses(
        (status = 201, description = "Invitation issued", body = Invitation),
        (status = 400, description = "Invalid invitation", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateInvitation",
    security(("SessionCookie" = []))
)]
#[post("/admin/invitations")]
pub async fn create_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<InvitationDraft>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let invitation = state
        .admin
        .create_invitation(&caller, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(invitation))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
