//! Paid subscription handler.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, SubscriptionReceipt};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Payment token from the card form and the chosen plan.
///
/// Both fields are optional on the wire so a missing value is reported with
/// its field name instead of a generic body error.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    #[schema(example = "pm_1Nv0aQ2eZvKYlo2C")]
    pub payment_method_id: Option<String>,
    #[schema(example = "gold")]
    pub plan: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription created", body = SubscriptionReceipt),
        (status = 400, description = "Invalid request or card rejected", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Payment processor unavailable", body = Error)
    ),
    tags = ["billing"],
    operation_id = "createSubscription",
    security(("SessionCookie" = []))
)]
#[post("/subscriptions")]
pub async fn create_subscription(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<web::Json<SubscriptionReceipt>> {
    let caller = session.require_user_id()?;
    let SubscriptionRequest {
        payment_method_id,
        plan,
    } = payload.into_inner();
    let receipt = state
        .subscriptions
        .create_subscription(&caller, payment_method_id.as_deref(), plan.as_deref())
        .await?;
    Ok(web::Json(receipt))
}
