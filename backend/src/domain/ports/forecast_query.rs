//! Driving port for the demand heatmap.
use async_trait::async_trait;

use crate::domain::{Error, Forecast};

#[async_trait]
pub trait ForecastQuery: Send + Sync {
    /// Per-city demand forecasts sorted by descending score, optionally
    /// filtered by a case-insensitive city or state substring.
    async fn forecasts(&self, filter: Option<&str>) -> Result<Vec<Forecast>, Error>;
}
