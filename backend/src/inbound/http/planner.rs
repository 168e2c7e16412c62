//! AI planner handlers: pricing, work-trip itineraries and road trips.
//!
//! Feature checks happen in the domain against the stored tier, so these
//! handlers only resolve the caller and forward the request.

use actix_web::{post, web};

use crate::domain::{
    Error, Itinerary, ItineraryRequest, PricingRequest, PricingSuggestion, RoadTripRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[utoipa::path(
    post,
    path = "/api/v1/planner/pricing",
    request_body = PricingRequest,
    responses(
        (status = 200, description = "Pricing suggestion", body = PricingSuggestion),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Planner not included in tier", body = Error),
        (status = 404, description = "Unknown city", body = Error),
        (status = 503, description = "AI backend unavailable", body = Error)
    ),
    tags = ["planner"],
    operation_id = "suggestPricing",
    security(("SessionCookie" = []))
)]
#[post("/planner/pricing")]
pub async fn suggest_pricing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PricingRequest>,
) -> ApiResult<web::Json<PricingSuggestion>> {
    let caller = session.require_user_id()?;
    let suggestion = state
        .planner
        .suggest_pricing(&caller, payload.into_inner())
        .await?;
    Ok(web::Json(suggestion))
}

#[utoipa::path(
    post,
    path = "/api/v1/planner/itinerary",
    request_body = ItineraryRequest,
    responses(
        (status = 200, description = "Itinerary", body = Itinerary),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Planner not included in tier", body = Error),
        (status = 503, description = "AI backend unavailable", body = Error)
    ),
    tags = ["planner"],
    operation_id = "planItinerary",
    security(("SessionCookie" = []))
)]
#[post("/planner/itinerary")]
pub async fn plan_itinerary(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ItineraryRequest>,
) -> ApiResult<web::Json<Itinerary>> {
    let caller = session.require_user_id()?;
    let itinerary = state
        .planner
        .plan_itinerary(&caller, payload.into_inner())
        .await?;
    Ok(web::Json(itinerary))
}

#[utoipa::path(
    post,
    path = "/api/v1/planner/road-trip",
    request_body = RoadTripRequest,
    responses(
        (status = 200, description = "Road trip plan", body = Itinerary),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Road trips not included in tier", body = Error),
        (status = 503, description = "AI backend unavailable", body = Error)
    ),
    tags = ["planner"],
    operation_id = "planRoadTrip",
    security(("SessionCookie" = []))
)]
#[post("/planner/road-trip")]
pub async fn plan_road_trip(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RoadTripRequest>,
) -> ApiResult<web::Json<Itinerary>> {
    let caller = session.require_user_id()?;
    let itinerary = state
        .planner
        .plan_road_trip(&caller, payload.into_inner())
        .await?;
    Ok(web::Json(itinerary))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{Role, Tier};
    use crate::inbound::http::test_utils::{TestHarness, sign_up_as};

    fn road_trip() -> Value {
        json!({
            "origin": "Dallas, TX",
            "destination": "San Francisco, CA",
            "travelMode": "car",
            "stops": 2,
        })
    }

    #[rstest]
    #[case(Tier::Free, StatusCode::FORBIDDEN)]
    #[case(Tier::Silver, StatusCode::FORBIDDEN)]
    #[case(Tier::Gold, StatusCode::OK)]
    #[actix_web::test]
    async fn pricing_is_gated_on_the_stored_tier(#[case] tier: Tier, #[case] status: StatusCode) {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;
        let (cookie, _) = sign_up_as(&app, &harness, "pro@example.com", tier, Role::Provider).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/planner/pricing")
                .cookie(cookie)
                .set_json(json!({ "city": "Miami", "month": 5 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), status);
        if status == StatusCode::OK {
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["demandScore"], 82);
            assert_eq!(body["suggestedRate"], 190.0);
            assert_eq!(body["season"]["month"], "June");
        }
    }

    #[actix_web::test]
    async fn itinerary_returns_generated_text() {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;
        let (cookie, _) =
            sign_up_as(&app, &harness, "pro@example.com", Tier::Gold, Role::Provider).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/planner/itinerary")
                .cookie(cookie)
                .set_json(json!({
                    "city": "Seattle",
                    "numberOfDays": 4,
                    "estimatedEarnings": 350.0,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["itinerary"], "Day 1: arrive and settle in");
    }

    #[rstest]
    #[case(Tier::Gold, Role::Provider, StatusCode::FORBIDDEN)]
    #[case(Tier::Platinum, Role::Customer, StatusCode::OK)]
    #[case(Tier::Free, Role::Admin, StatusCode::OK)]
    #[actix_web::test]
    async fn road_trips_need_platinum_or_admin(
        #[case] tier: Tier,
        #[case] role: Role,
        #[case] status: StatusCode,
    ) {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;
        let (cookie, _) = sign_up_as(&app, &harness, "trip@example.com", tier, role).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/planner/road-trip")
                .cookie(cookie)
                .set_json(road_trip())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), status);
    }
}
