use axum::{
    body::StreamBody,
    extract::{Path, State},
    http::header,
    response::{AppendHeaders, IntoResponse},
    routing::get,
    Router,
};
use intake_common::models::FileKind;
use tokio_util::io::ReaderStream;

use crate::{error::ApiError, state::Services};

pub fn create_route(services: Services) -> Router {
    Router::new().route("/api/reports/download/:report_id", get(download_report)).with_state(services)
}

#[tracing::instrument(skip(services))]
pub async fn download_report(State(services): State<Services>, Path(report_id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let Some(report) = services.report_store.get_report(&report_id).await? else {
        return Err(ApiError::NotFound("Report not found".to_string()));
    };
    let headers = AppendHeaders([
        (header::CONTENT_TYPE, FileKind::Pdf.content_type().to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", &report.file_name)),
        (header::CONTENT_LENGTH, report.length.to_string()),
    ]);
    Ok((headers, StreamBody::new(ReaderStream::new(report.file))))
}
