use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_common::error::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors a handler answers the client with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File type not allowed. Allowed: {allowed}")]
    UnsupportedExtension { allowed: String },

    #[error("No file was uploaded")]
    MissingFile,

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Too many requests, try again later")]
    RateLimited,

    #[error("Processing queue is full, try again later")]
    QueueFull,

    #[error("Service is shutting down")]
    Unavailable,

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedExtension { .. } | ApiError::MissingFile | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::QueueFull | ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::UnsupportedExtension { .. } => "unsupported_file_type",
            ApiError::MissingFile => "missing_file",
            ApiError::Multipart(_) => "bad_request",
            ApiError::RateLimited => "rate_limited",
            ApiError::QueueFull => "queue_full",
            ApiError::Unavailable => "unavailable",
            ApiError::NotFound(_) => "not_found",
            ApiError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", &self);
        }
        let message = self.to_string();
        let body = Json(json!({
            "detail": message,
            "error": {
                "type": self.error_type(),
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

/// Failures while building the service collection.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not prepare storage: {0}")]
    Storage(#[from] StorageError),

    #[error("could not create validator: {0}")]
    Validator(#[from] intake_common::error::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn body_carries_detail_and_typed_error() {
        let response = ApiError::UnsupportedExtension { allowed: ".csv, .pdf".to_string() }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["detail"], "File type not allowed. Allowed: .csv, .pdf");
        assert_eq!(body["error"]["type"], "unsupported_file_type");
        assert_eq!(body["error"]["message"], body["detail"]);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::QueueFull.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::NotFound("x".to_string()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Storage(StorageError::Upload("eof".to_string())).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
