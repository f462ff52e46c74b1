use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FileKind;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Accepted,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Accepted => "accepted",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Persisted state of one uploaded file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobModel {
    pub id: String,
    pub kind: FileKind,
    /// File name of the stored upload, `<id><extension>`.
    pub source_file: String,
    pub created: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub message: Option<String>,
}

impl JobModel {
    pub fn new(id: String, kind: FileKind) -> Self {
        JobModel {
            source_file: format!("{}{}", &id, kind.extension()),
            id,
            kind,
            created: Utc::now(),
            finished: None,
            status: JobStatus::Accepted,
            message: None,
        }
    }
}
