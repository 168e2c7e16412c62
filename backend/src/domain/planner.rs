//! AI planner: pricing suggestions, work-trip itineraries and road trips.
//!
//! Every entry point loads the caller's record and checks the relevant
//! feature before doing any work. Prompts are rendered in
//! [`crate::domain::prompts`]; the AI adapter only transports text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::accounts::load_caller_features;
use crate::domain::forecast_service::ForecastService;
use crate::domain::market::{CompetitorSnapshot, Season, find_city, season_for};
use crate::domain::ports::{
    GenerativeAi, GenerativeAiError, PlannerService, Prompt, UserRepository,
};
use crate::domain::prompts::{
    PricingAnswer, PricingContext, decode_json, itinerary_prompt, pricing_prompt,
    road_trip_prompt,
};
use crate::domain::{Error, Feature, UserId};

pub const MAX_TRIP_DAYS: u8 = 31;
pub const MAX_ROAD_TRIP_STOPS: u8 = 10;
const PLACE_MAX: usize = 120;

/// Pricing request for one city and month.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[schema(example = "Miami")]
    pub city: String,
    /// Zero-based month, `0` for January.
    #[schema(example = 5)]
    pub month: u8,
}

/// AI pricing suggestion with the market data it was based on.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSuggestion {
    pub city: String,
    pub state: String,
    pub demand_score: u8,
    /// Hourly rate in dollars.
    pub suggested_rate: f64,
    pub expected_bookings: f64,
    pub projected_revenue: i64,
    pub reasoning: String,
    pub competitors: CompetitorSnapshot,
    pub season: Season,
}

/// Work-trip itinerary request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRequest {
    pub city: String,
    #[schema(example = 5)]
    pub number_of_days: u8,
    /// Expected earnings per day in dollars.
    pub estimated_earnings: f64,
    /// Defaults to the city's first recommended stay area.
    #[serde(default)]
    pub stay_area: Option<String>,
}

/// How a road trip is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Car,
    Bus,
    Plane,
    Mix,
}

impl TravelMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Plane => "plane",
            Self::Mix => "mix",
        }
    }
}

impl FromStr for TravelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "bus" => Ok(Self::Bus),
            "plane" => Ok(Self::Plane),
            "mix" => Ok(Self::Mix),
            _ => Err(invalid_field(
                "travelMode",
                "travel mode must be car, bus, plane or mix",
            )),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-stop road trip request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadTripRequest {
    #[schema(example = "Dallas, TX")]
    pub origin: String,
    #[schema(example = "San Francisco, CA")]
    pub destination: String,
    #[schema(example = "car")]
    pub travel_mode: String,
    pub stops: u8,
}

/// Generated itinerary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Itinerary {
    /// Itinerary text produced by the model.
    pub itinerary: String,
}

fn invalid_field(field: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

fn place(raw: &str, field: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > PLACE_MAX {
        return Err(invalid_field(
            field,
            &format!("{field} must be between 1 and {PLACE_MAX} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn map_ai_error(error: GenerativeAiError) -> Error {
    Error::service_unavailable(error.to_string()).with_details(json!({ "upstream": "ai" }))
}

fn unreadable_answer(error: impl fmt::Display) -> Error {
    Error::service_unavailable(format!("planner answer was unreadable: {error}"))
        .with_details(json!({ "upstream": "ai" }))
}

/// Planner backed by the generative-AI port.
#[derive(Clone)]
pub struct AiPlanner<U, A> {
    users: Arc<U>,
    ai: Arc<A>,
    forecasts: ForecastService<A>,
}

impl<U, A> AiPlanner<U, A> {
    pub fn new(users: Arc<U>, ai: Arc<A>) -> Self {
        Self {
            users,
            forecasts: ForecastService::new(Arc::clone(&ai)),
            ai,
        }
    }
}

impl<U, A> AiPlanner<U, A>
where
    U: UserRepository,
    A: GenerativeAi,
{
    async fn require(&self, caller: &UserId, feature: Feature) -> Result<(), Error> {
        let (_, features) = load_caller_features(self.users.as_ref(), caller).await?;
        features.require(feature).inspect_err(|_| {
            info!(user_id = %caller, feature = %feature, "planner feature denied");
        })
    }

    async fn free_text(&self, prompt: &Prompt) -> Result<String, Error> {
        let text = self.ai.generate(prompt).await.map_err(|err| {
            warn!(error = %err, "planner generation failed");
            map_ai_error(err)
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(unreadable_answer("empty response"));
        }
        Ok(text.to_owned())
    }
}

#[async_trait]
impl<U, A> PlannerService for AiPlanner<U, A>
where
    U: UserRepository,
    A: GenerativeAi,
{
    async fn suggest_pricing(
        &self,
        caller: &UserId,
        request: PricingRequest,
    ) -> Result<PricingSuggestion, Error> {
        self.require(caller, Feature::Planner).await?;
        let season = season_for(request.month)
            .ok_or_else(|| invalid_field("month", "month must be between 0 and 11"))?;
        let city = find_city(&request.city)
            .ok_or_else(|| Error::not_found(format!("city '{}' is not supported", request.city)))?;

        let demand_score = self.forecasts.score_or_fallback(city).await;
        let competitors = CompetitorSnapshot::sample(city, &mut rand::thread_rng());
        let prompt = pricing_prompt(&PricingContext {
            city,
            demand_score,
            season,
            competitors: &competitors,
        });
        let raw = self.ai.generate(&prompt).await.map_err(|err| {
            warn!(city = city.name, error = %err, "pricing generation failed");
            map_ai_error(err)
        })?;
        let answer: PricingAnswer = decode_json(&raw).map_err(unreadable_answer)?;
        if !answer.suggested_rate.is_finite()
            || !answer.expected_bookings.is_finite()
            || !answer.projected_revenue.is_finite()
        {
            return Err(unreadable_answer("non-numeric figures"));
        }

        info!(user_id = %caller, city = city.name, month = season.month, "pricing suggested");
        Ok(PricingSuggestion {
            city: city.name.to_owned(),
            state: city.state.to_owned(),
            demand_score,
            suggested_rate: answer.suggested_rate,
            expected_bookings: answer.expected_bookings,
            // Finite checked above; `as` saturates out-of-range values.
            projected_revenue: answer.projected_revenue.round() as i64,
            reasoning: answer.reasoning,
            competitors,
            season: *season,
        })
    }

    async fn plan_itinerary(
        &self,
        caller: &UserId,
        request: ItineraryRequest,
    ) -> Result<Itinerary, Error> {
        self.require(caller, Feature::Planner).await?;
        if !(1..=MAX_TRIP_DAYS).contains(&request.number_of_days) {
            return Err(invalid_field(
                "numberOfDays",
                &format!("number of days must be between 1 and {MAX_TRIP_DAYS}"),
            ));
        }
        if !request.estimated_earnings.is_finite() || request.estimated_earnings < 0.0 {
            return Err(invalid_field(
                "estimatedEarnings",
                "estimated earnings must be a non-negative number",
            ));
        }
        let city = find_city(&request.city)
            .ok_or_else(|| Error::not_found(format!("city '{}' is not supported", request.city)))?;
        let stay_area = match request.stay_area.as_deref().map(str::trim) {
            Some(area) if !area.is_empty() => place(area, "stayArea")?,
            _ => city.stay_areas[0].to_owned(),
        };

        let prompt = itinerary_prompt(
            city,
            request.number_of_days,
            request.estimated_earnings,
            &stay_area,
        );
        let itinerary = self.free_text(&prompt).await?;
        info!(
            user_id = %caller,
            city = city.name,
            days = request.number_of_days,
            "itinerary planned"
        );
        Ok(Itinerary { itinerary })
    }

    async fn plan_road_trip(
        &self,
        caller: &UserId,
        request: RoadTripRequest,
    ) -> Result<Itinerary, Error> {
        self.require(caller, Feature::RoadTrip).await?;
        let origin = place(&request.origin, "origin")?;
        let destination = place(&request.destination, "destination")?;
        let travel_mode: TravelMode = request.travel_mode.parse()?;
        if request.stops > MAX_ROAD_TRIP_STOPS {
            return Err(invalid_field(
                "stops",
                &format!("stops must be between 0 and {MAX_ROAD_TRIP_STOPS}"),
            ));
        }

        let prompt = road_trip_prompt(&origin, &destination, travel_mode.as_str(), request.stops);
        let itinerary = self.free_text(&prompt).await?;
        info!(
            user_id = %caller,
            travel_mode = %travel_mode,
            stops = request.stops,
            "road trip planned"
        );
        Ok(Itinerary { itinerary })
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
