//! Marketplace listing handlers.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::{Error, ListingDraft, ServiceListing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every published listing, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    responses(
        (status = 200, description = "Listings", body = [ServiceListing]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["listings"],
    operation_id = "listListings",
    security(("SessionCookie" = []))
)]
#[get("/listings")]
pub async fn list_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ServiceListing>>> {
    session.require_user_id()?;
    let listings = state.listings_query.list_listings().await?;
    Ok(web::Json(listings))
}

/// Publish a listing owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = ListingDraft,
    responses(
        (status = 201, description = "Listing published", body = ServiceListing),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["listings"],
    operation_id = "createListing",
    security(("SessionCookie" = []))
)]
#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ListingDraft>,
) -> ApiResult<HttpResponse> {
    let provider = session.require_user_id()?;
    let listing = state
        .listings
        .create_listing(&provider, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{Role, Tier};
    use crate::inbound::http::test_utils::{TestHarness, sign_up_as};

    fn draft(rate: f64, instagram: Option<&str>) -> Value {
        json!({
            "serviceType": "barber",
            "description": "Classic cuts and hot towel shaves on the road.",
            "rate": rate,
            "location": "Chelsea, New York",
            "instagramUrl": instagram,
        })
    }

    #[actix_web::test]
    async fn listings_require_a_session() {
        let app = test::init_service(TestHarness::new().app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/listings")
                .set_json(draft(45.0, None))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn published_listings_are_listed_newest_first() {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;
        let (cookie, provider) =
            sign_up_as(&app, &harness, "pro@example.com", Tier::Free, Role::Provider).await;

        for rate in [40.0, 55.0] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/listings")
                    .cookie(cookie.clone())
                    .set_json(draft(rate, Some("https://instagram.com/cuts")))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["providerId"], provider.as_ref());
            assert_eq!(body["serviceType"], "barber");
        }

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/listings")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let listings = body.as_array().expect("array");
        assert_eq!(listings.len(), 2);
    }

    #[rstest]
    #[case(0.5, None, "rate")]
    #[case(45.0, Some("ftp://example.com/me"), "instagramUrl")]
    #[actix_web::test]
    async fn invalid_listings_name_the_field(
        #[case] rate: f64,
        #[case] instagram: Option<&str>,
        #[case] field: &str,
    ) {
        let harness = TestHarness::new();
        let app = test::init_service(harness.app()).await;
        let (cookie, _) =
            sign_up_as(&app, &harness, "pro@example.com", Tier::Free, Role::Provider).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/listings")
                .cookie(cookie)
                .set_json(draft(rate, instagram))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }
}
