use serde::{Deserialize, Serialize};

use crate::util::routes::validation_status_route;

pub const PROCESSING_STARTED: &str = "processing_started";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponseDto {
    pub message: String,
    pub file_id: String,
    pub status: String,
    pub check_status_at: String,
}

impl UploadResponseDto {
    pub fn processing_started(file_id: &str) -> Self {
        UploadResponseDto {
            message: "File uploaded successfully".to_string(),
            file_id: file_id.to_string(),
            status: PROCESSING_STARTED.to_string(),
            check_status_at: validation_status_route(file_id),
        }
    }
}
