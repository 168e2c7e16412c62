//! Demand heatmap: per-city forecasts from the generative-AI port.
//!
//! Cities are predicted one after another so a burst of heatmap requests does
//! not trip upstream rate limits. A city whose prediction fails still appears,
//! with a random fallback score.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::market::{CITIES, City, Forecast, fallback_demand_score};
use crate::domain::ports::{ForecastQuery, GenerativeAi};
use crate::domain::prompts::{DemandPrediction, decode_json, demand_prompt};

/// Forecast service implementing [`ForecastQuery`].
#[derive(Clone)]
pub struct ForecastService<A> {
    ai: Arc<A>,
}

impl<A> ForecastService<A> {
    pub fn new(ai: Arc<A>) -> Self {
        Self { ai }
    }
}

impl<A> ForecastService<A>
where
    A: GenerativeAi,
{
    /// Predicted score for `city`, or `None` when the model fails or answers
    /// with something unusable.
    pub(crate) async fn predict(&self, city: &City) -> Option<u8> {
        let raw = match self.ai.generate(&demand_prompt(city)).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(city = city.name, error = %err, "demand prediction failed");
                return None;
            }
        };
        match decode_json::<DemandPrediction>(&raw) {
            Ok(prediction) => {
                debug!(city = city.name, reasoning = %prediction.reasoning, "demand predicted");
                prediction.score()
            }
            Err(err) => {
                warn!(city = city.name, error = %err, "demand prediction unreadable");
                None
            }
        }
    }

    /// Predicted score for `city`, falling back to a random score.
    pub(crate) async fn score_or_fallback(&self, city: &City) -> u8 {
        let predicted = self.predict(city).await;
        predicted.unwrap_or_else(|| fallback_demand_score(&mut rand::thread_rng()))
    }
}

fn matches_filter(city: &City, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    city.name.to_lowercase().contains(&needle) || city.state.to_lowercase().contains(&needle)
}

#[async_trait]
impl<A> ForecastQuery for ForecastService<A>
where
    A: GenerativeAi,
{
    async fn forecasts(&self, filter: Option<&str>) -> Result<Vec<Forecast>, Error> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        let mut forecasts = Vec::new();
        for city in CITIES
            .iter()
            .filter(|city| filter.is_none_or(|f| matches_filter(city, f)))
        {
            let score = self.score_or_fallback(city).await;
            forecasts.push(Forecast::new(city, score));
        }
        forecasts.sort_by(|a, b| b.demand_score.cmp(&a.demand_score));
        Ok(forecasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{GenerativeAiError, MockGenerativeAi, OutputFormat, Prompt};
    use rstest::rstest;

    fn score_by_city(prompt: &Prompt) -> Result<String, GenerativeAiError> {
        if prompt.text.contains("City: Miami") {
            return Ok("{\"demandScore\": 91, \"reasoning\": \"Pride week\"}".to_owned());
        }
        if prompt.text.contains("City: Boston") {
            return Err(GenerativeAiError::upstream("429 Too Many Requests"));
        }
        if prompt.text.contains("City: Dallas") {
            return Ok("not json".to_owned());
        }
        Ok("{\"demandScore\": 20, \"reasoning\": \"quiet\"}".to_owned())
    }

    #[rstest]
    #[tokio::test]
    async fn every_city_is_forecast_and_sorted() {
        let mut ai = MockGenerativeAi::new();
        ai.expect_generate()
            .withf(|prompt| prompt.format == OutputFormat::Json)
            .times(CITIES.len())
            .returning(score_by_city);
        let service = ForecastService::new(Arc::new(ai));

        let forecasts = service.forecasts(None).await.expect("forecasts");
        assert_eq!(forecasts.len(), CITIES.len());
        assert_eq!(forecasts.first().map(|f| f.city.as_str()), Some("Miami"));
        assert!(
            forecasts
                .windows(2)
                .all(|pair| pair[0].demand_score >= pair[1].demand_score)
        );
        for city in ["Boston", "Dallas"] {
            let fallback = forecasts
                .iter()
                .find(|f| f.city == city)
                .expect("fallback present");
            assert!((30..80).contains(&fallback.demand_score));
        }
    }

    #[rstest]
    #[case("tx", &["Dallas", "Houston"])]
    #[case("san", &["San Francisco"])]
    #[case("nowhere", &[])]
    #[tokio::test]
    async fn filter_matches_city_or_state(#[case] filter: &str, #[case] expected: &[&str]) {
        let mut ai = MockGenerativeAi::new();
        ai.expect_generate()
            .times(expected.len())
            .returning(|_| Ok("{\"demandScore\": 55}".to_owned()));
        let service = ForecastService::new(Arc::new(ai));

        let forecasts = service.forecasts(Some(filter)).await.expect("forecasts");
        let mut cities: Vec<_> = forecasts.iter().map(|f| f.city.as_str()).collect();
        cities.sort_unstable();
        assert_eq!(cities, expected);
    }
}
