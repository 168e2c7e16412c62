//! Prompt templates for the generative-AI port and decoding of the JSON
//! answers they ask for.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::market::{City, CompetitorSnapshot, Season};
use crate::domain::ports::Prompt;

/// Decoded answer to [`demand_prompt`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandPrediction {
    pub demand_score: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl DemandPrediction {
    /// Score clamped to `0..=100` and rounded.
    pub fn score(&self) -> Option<u8> {
        if !self.demand_score.is_finite() {
            return None;
        }
        // Clamped to 0..=100 so the cast cannot truncate.
        Some(self.demand_score.clamp(0.0, 100.0).round() as u8)
    }
}

/// Decoded answer to [`pricing_prompt`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingAnswer {
    pub suggested_rate: f64,
    pub expected_bookings: f64,
    pub projected_revenue: f64,
    pub reasoning: String,
}

/// Decode a JSON answer, tolerating a surrounding Markdown code fence.
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim())
}

pub fn demand_prompt(city: &City) -> Prompt {
    Prompt::json(format!(
        "You are an AI expert in predicting the demand for massage services in different cities.\n\
         \n\
         Based on the city's population and LGBTQ+ index, predict the demand for massage services.\n\
         \n\
         City: {name}\n\
         Population: {population}\n\
         LGBTQ+ Index: {index}\n\
         \n\
         Answer with a JSON object {{\"demandScore\": number between 0 and 100, \"reasoning\": string}}.",
        name = city.name,
        population = city.population,
        index = city.lgbtq_index,
    ))
}

/// Inputs to the pricing prompt.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub city: &'a City,
    pub demand_score: u8,
    pub season: &'a Season,
    pub competitors: &'a CompetitorSnapshot,
}

pub fn pricing_prompt(ctx: &PricingContext<'_>) -> Prompt {
    Prompt::json(format!(
        "You are an AI-powered pricing strategist for professional masseurs.\n\
         Given the following information about a city, calculate the optimal hourly rate, \
         expected bookings and projected revenue, with a short explanation.\n\
         \n\
         City: {name}, {state}\n\
         Demand Spike Probability: {demand}%\n\
         LGBTQ+ Index: {index}\n\
         Month: {month}\n\
         Optimal Days: {days}\n\
         Seasonal Multiplier: {multiplier}\n\
         Competitor Count: {competitors}\n\
         Market Saturation: {saturation}\n\
         Average Service Rate: ${avg_rate}/hr\n\
         \n\
         Keep the rate competitive yet maximise earnings. Projected revenue must account for \
         the optimal days and be an integer. Keep the reasoning under 100 words.\n\
         Answer with a JSON object {{\"suggestedRate\": number, \"expectedBookings\": number, \
         \"projectedRevenue\": integer, \"reasoning\": string}}.",
        name = ctx.city.name,
        state = ctx.city.state,
        demand = ctx.demand_score,
        index = ctx.city.lgbtq_index,
        month = ctx.season.month,
        days = ctx.season.optimal_days,
        multiplier = ctx.season.multiplier,
        competitors = ctx.competitors.total_active,
        saturation = ctx.competitors.saturation.as_str(),
        avg_rate = ctx.competitors.avg_rate,
    ))
}

pub fn itinerary_prompt(
    city: &City,
    number_of_days: u8,
    estimated_earnings: f64,
    stay_area: &str,
) -> Prompt {
    Prompt::text(format!(
        "You are an AI assistant that generates trip itineraries for masseurs.\n\
         \n\
         Generate a trip itinerary for the following trip:\n\
         City: {name}\n\
         Number of Days: {number_of_days}\n\
         Estimated Earnings per day: {estimated_earnings}\n\
         Ideal Stay Area: {stay_area}\n\
         \n\
         Include a daily schedule, pricing strategies, location tips and revenue goals. \
         Keep it concise and easy to follow.",
        name = city.name,
    ))
}

pub fn road_trip_prompt(origin: &str, destination: &str, travel_mode: &str, stops: u8) -> Prompt {
    Prompt::text(format!(
        "You are an AI assistant that creates optimised road trip itineraries for travelling \
         masseurs. Plan a route with profitable overnight stops in cities with good demand.\n\
         \n\
         Origin: {origin}\n\
         Destination: {destination}\n\
         Travel Mode: {travel_mode}\n\
         Number of Overnight Stops: {stops}\n\
         \n\
         Include a logical route, {stops} overnight stops with good demand for massage \
         services, estimated travel time for each leg and a one-line rationale per stop. \
         Keep the output concise and well structured."
    ))
}
