use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError, Router};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod consts;
pub mod dispatcher;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

use state::Services;

pub fn build_router(services: Services) -> Router {
    let timeout = services.settings.request_timeout;
    Router::new()
        .merge(routes::root::create_route(services.clone()))
        .merge(routes::upload::create_route(services.clone()))
        .merge(routes::validation::create_route(services.clone()))
        .merge(routes::reports::create_route(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
                .layer(TimeoutLayer::new(timeout)),
        )
}
