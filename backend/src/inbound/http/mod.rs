//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod admin;
pub mod auth;
pub mod error;
pub mod forecasts;
pub mod health;
pub mod listings;
pub mod planner;
pub mod session;
pub mod session_config;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler and the extractor error handlers.
///
/// The caller owns the scope so it can wrap it in the session middleware.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::login)
        .service(auth::signup)
        .service(auth::logout)
        .service(auth::password_reset)
        .service(users::current_user)
        .service(users::user_profile)
        .service(users::submit_review)
        .service(listings::list_listings)
        .service(listings::create_listing)
        .service(forecasts::list_forecasts)
        .service(planner::suggest_pricing)
        .service(planner::plan_itinerary)
        .service(planner::plan_road_trip)
        .service(subscriptions::create_subscription)
        .service(admin::list_users)
        .service(admin::stats)
        .service(admin::update_access)
        .service(admin::create_invitation);
}
