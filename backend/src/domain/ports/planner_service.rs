//! Driving port for the AI planner.
use async_trait::async_trait;

use crate::domain::{
    Error, Itinerary, ItineraryRequest, PricingRequest, PricingSuggestion, RoadTripRequest, UserId,
};

#[async_trait]
pub trait PlannerService: Send + Sync {
    /// Suggest a rate for a city and month. Requires the planner feature.
    async fn suggest_pricing(
        &self,
        caller: &UserId,
        request: PricingRequest,
    ) -> Result<PricingSuggestion, Error>;

    /// Draft a work-trip itinerary. Requires the planner feature.
    async fn plan_itinerary(
        &self,
        caller: &UserId,
        request: ItineraryRequest,
    ) -> Result<Itinerary, Error>;

    /// Draft a multi-stop road trip. Requires the road-trip feature.
    async fn plan_road_trip(
        &self,
        caller: &UserId,
        request: RoadTripRequest,
    ) -> Result<Itinerary, Error>;
}
