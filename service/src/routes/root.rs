use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use intake_common::dtos::{RootDto, RootLinks, StatusDto};

use tracing::warn;

use crate::consts::{NAME, VERSION};
use crate::error::ApiError;
use crate::state::Services;

pub fn create_route(services: Services) -> Router {
    Router::new()
        .route("/", get(root_links))
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .with_state(services)
}

pub async fn root_links() -> Json<RootDto> {
    Json(RootDto {
        name: NAME,
        version: VERSION,
        status: "running",
        _links: RootLinks {
            upload: "/api/upload",
            health: "/api/health",
            status: "/api/status",
        },
    })
}

#[tracing::instrument]
pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn status(State(services): State<Services>, connect_info: Option<ConnectInfo<SocketAddr>>) -> Result<Json<StatusDto>, ApiError> {
    let client = connect_info.map(|ConnectInfo(addr)| addr.ip());
    if !services.status_rate_limiter.check(client) {
        warn!("Status rate exceeded for {:?}", client);
        return Err(ApiError::RateLimited);
    }
    Ok(Json(StatusDto {
        status: "running",
        timestamp: Utc::now(),
        uptime_seconds: services.started.elapsed().as_secs(),
        version: VERSION,
        queue: services.dispatcher.stats(),
    }))
}
