use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use intake_common::{dtos::JobDto, persistence::ResultLookup};

use crate::{error::ApiError, state::Services};

pub fn create_route(services: Services) -> Router {
    Router::new()
        .route("/api/validation/status/:file_id", get(job_status))
        .route("/api/validation/results/:file_id", get(job_result))
        .with_state(services)
}

#[tracing::instrument(skip(services))]
pub async fn job_status(State(services): State<Services>, Path(file_id): Path<String>) -> Result<Json<JobDto>, ApiError> {
    match services.job_persistence.get(&file_id).await? {
        Some(job) => Ok(Json(job.to_dto())),
        None => Err(ApiError::NotFound("File not found".to_string())),
    }
}

/// 200 with the stored outcome, 202 while still running, 422 once failed.
#[tracing::instrument(skip(services))]
pub async fn job_result(State(services): State<Services>, Path(file_id): Path<String>) -> Result<Response, ApiError> {
    match services.result_store.get_result(&file_id).await? {
        ResultLookup::Ready(result) => Ok(Json(result).into_response()),
        ResultLookup::Pending(job) => Ok((StatusCode::ACCEPTED, Json(job.to_dto())).into_response()),
        ResultLookup::Failed(job) => Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(job.to_dto())).into_response()),
        ResultLookup::NotFound => Err(ApiError::NotFound("Result not found".to_string())),
    }
}
