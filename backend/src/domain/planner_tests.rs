//! Tests for the AI planner.

use super::*;
use crate::domain::ports::{MockGenerativeAi, MockUserRepository, OutputFormat};
use crate::domain::{AccountStatus, Email, ErrorCode, Role, Tier, User};
use rstest::rstest;

fn caller() -> UserId {
    UserId::new("planner-user").expect("uid")
}

fn users(tier: Tier, role: Role) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(move |id| {
        Ok(Some(
            User::new(
                id.clone(),
                Email::new("planner@example.com").expect("email"),
                role,
                tier,
                AccountStatus::Active,
                0.0,
            )
            .expect("user"),
        ))
    });
    users
}

fn planner(
    users: MockUserRepository,
    ai: MockGenerativeAi,
) -> AiPlanner<MockUserRepository, MockGenerativeAi> {
    AiPlanner::new(Arc::new(users), Arc::new(ai))
}

fn answer(prompt: &Prompt) -> Result<String, GenerativeAiError> {
    if prompt.text.contains("predicting the demand") {
        return Ok("{\"demandScore\": 77, \"reasoning\": \"festival\"}".to_owned());
    }
    Ok("```json\n{\"suggestedRate\": 210, \"expectedBookings\": 18, \
        \"projectedRevenue\": 3780.4, \"reasoning\": \"Peak season\"}\n```"
        .to_owned())
}

fn pricing(city: &str, month: u8) -> PricingRequest {
    PricingRequest {
        city: city.to_owned(),
        month,
    }
}

#[rstest]
#[case(Tier::Free, Role::Customer)]
#[case(Tier::Silver, Role::Provider)]
#[tokio::test]
async fn pricing_requires_planner_feature(#[case] tier: Tier, #[case] role: Role) {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(tier, role), ai)
        .suggest_pricing(&caller(), pricing("Miami", 5))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(
        err.details().and_then(|d| d.get("feature")).and_then(|v| v.as_str()),
        Some("planner")
    );
}

#[rstest]
#[tokio::test]
async fn pricing_combines_market_data_and_answer() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate()
        .withf(|prompt| prompt.format == OutputFormat::Json)
        .times(2)
        .returning(answer);

    let suggestion = planner(users(Tier::Gold, Role::Provider), ai)
        .suggest_pricing(&caller(), pricing("miami", 5))
        .await
        .expect("suggestion");
    assert_eq!(suggestion.city, "Miami");
    assert_eq!(suggestion.demand_score, 77);
    assert_eq!(suggestion.suggested_rate, 210.0);
    assert_eq!(suggestion.projected_revenue, 3780);
    assert_eq!(suggestion.season.month, "June");
    assert_eq!(suggestion.competitors.avg_rate, 180);
}

#[rstest]
#[tokio::test]
async fn unknown_city_is_not_found() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(Tier::Platinum, Role::Provider), ai)
        .suggest_pricing(&caller(), pricing("Atlantis", 2))
        .await
        .expect_err("unknown city");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn month_outside_the_year_is_invalid() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(Tier::Gold, Role::Provider), ai)
        .suggest_pricing(&caller(), pricing("Miami", 12))
        .await
        .expect_err("bad month");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn malformed_pricing_answer_is_upstream_failure() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().returning(|prompt| {
        if prompt.text.contains("predicting the demand") {
            Ok("{\"demandScore\": 60}".to_owned())
        } else {
            Ok("Charge about $200".to_owned())
        }
    });

    let err = planner(users(Tier::Gold, Role::Provider), ai)
        .suggest_pricing(&caller(), pricing("Boston", 0))
        .await
        .expect_err("unreadable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn itinerary_defaults_to_first_stay_area() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate()
        .withf(|prompt| {
            prompt.format == OutputFormat::Text
                && prompt.text.contains("Ideal Stay Area: Castro District")
        })
        .times(1)
        .returning(|_| Ok("  Day 1: arrive  ".to_owned()));

    let itinerary = planner(users(Tier::Gold, Role::Provider), ai)
        .plan_itinerary(
            &caller(),
            ItineraryRequest {
                city: "San Francisco".to_owned(),
                number_of_days: 3,
                estimated_earnings: 400.0,
                stay_area: None,
            },
        )
        .await
        .expect("itinerary");
    assert_eq!(itinerary.itinerary, "Day 1: arrive");
}

#[rstest]
#[case(0, 100.0, "numberOfDays")]
#[case(32, 100.0, "numberOfDays")]
#[case(5, -1.0, "estimatedEarnings")]
#[tokio::test]
async fn itinerary_rejects_out_of_range_inputs(
    #[case] days: u8,
    #[case] earnings: f64,
    #[case] field: &str,
) {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(Tier::Gold, Role::Provider), ai)
        .plan_itinerary(
            &caller(),
            ItineraryRequest {
                city: "Seattle".to_owned(),
                number_of_days: days,
                estimated_earnings: earnings,
                stay_area: None,
            },
        )
        .await
        .expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
        Some(field)
    );
}

fn road_trip(mode: &str, stops: u8) -> RoadTripRequest {
    RoadTripRequest {
        origin: "Dallas, TX".to_owned(),
        destination: "San Francisco, CA".to_owned(),
        travel_mode: mode.to_owned(),
        stops,
    }
}

#[rstest]
#[tokio::test]
async fn road_trip_is_platinum_only() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(Tier::Gold, Role::Provider), ai)
        .plan_road_trip(&caller(), road_trip("car", 2))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case("boat", 2)]
#[case("car", 11)]
#[tokio::test]
async fn road_trip_validates_mode_and_stops(#[case] mode: &str, #[case] stops: u8) {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate().never();

    let err = planner(users(Tier::Platinum, Role::Customer), ai)
        .plan_road_trip(&caller(), road_trip(mode, stops))
        .await
        .expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn road_trip_upstream_failure_is_unavailable() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate()
        .return_once(|_| Err(GenerativeAiError::upstream("timed out")));

    let err = planner(users(Tier::Platinum, Role::Customer), ai)
        .plan_road_trip(&caller(), road_trip("mix", 3))
        .await
        .expect_err("upstream");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn admins_plan_road_trips_regardless_of_tier() {
    let mut ai = MockGenerativeAi::new();
    ai.expect_generate()
        .withf(|prompt| prompt.text.contains("Travel Mode: plane"))
        .return_once(|_| Ok("Fly to Denver".to_owned()));

    let itinerary = planner(users(Tier::Free, Role::Admin), ai)
        .plan_road_trip(&caller(), road_trip("Plane", 1))
        .await
        .expect("itinerary");
    assert_eq!(itinerary.itinerary, "Fly to Denver");
}
