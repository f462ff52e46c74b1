use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::JobStatus;

#[derive(Debug, Serialize)]
pub struct JobDto {
    pub id: String,
    pub status: JobStatus,
    pub extension: &'static str,
    pub message: Option<String>,
    pub created: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    #[serde(rename = "_links")]
    pub _links: JobLinks,
}

#[derive(Debug, Serialize)]
pub struct JobLinks {
    #[serde(rename = "self")]
    pub _self: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}
