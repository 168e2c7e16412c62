//! Demand heatmap handler.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, Forecast};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Optional city or state filter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ForecastParams {
    /// Case-insensitive substring of the city or state name.
    #[param(example = "florida")]
    pub search: Option<String>,
}

/// Per-city demand forecasts sorted by descending demand.
#[utoipa::path(
    get,
    path = "/api/v1/forecasts",
    params(ForecastParams),
    responses(
        (status = 200, description = "Forecasts", body = [Forecast]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["forecasts"],
    operation_id = "listForecasts",
    security(("SessionCookie" = []))
)]
#[get("/forecasts")]
pub async fn list_forecasts(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ForecastParams>,
) -> ApiResult<web::Json<Vec<Forecast>>> {
    session.require_user_id()?;
    let forecasts = state.forecasts.forecasts(params.search.as_deref()).await?;
    Ok(web::Json(forecasts))
}
