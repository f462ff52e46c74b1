use serde_json::Value;
use tokio::fs::File;

use crate::{
    error::StorageError,
    models::{FileKind, JobModel},
};

#[async_trait::async_trait]
pub trait IJobPersistence: Send + Sync {
    /// Records a new `accepted` job under a token that has never been issued before.
    async fn create(&self, kind: FileKind) -> Result<JobModel, StorageError>;
    async fn get(&self, job_id: &str) -> Result<Option<JobModel>, StorageError>;
    async fn set_processing(&self, job_id: &str) -> Result<JobModel, StorageError>;
    async fn set_ready(&self, job_id: &str) -> Result<(), StorageError>;
    async fn set_error(&self, job_id: &str, message: &str) -> Result<(), StorageError>;
    /// Jobs that have not reached a terminal state.
    async fn unfinished(&self) -> Result<Vec<JobModel>, StorageError>;
}

#[derive(Debug)]
pub enum ResultLookup {
    Ready(Value),
    Pending(JobModel),
    Failed(JobModel),
    NotFound,
}

#[async_trait::async_trait]
pub trait IResultStore: Send + Sync {
    async fn put_result(&self, job_id: &str, result: &Value) -> Result<(), StorageError>;
    async fn get_result(&self, job_id: &str) -> Result<ResultLookup, StorageError>;
}

#[derive(Debug)]
pub struct ReportFile {
    pub file: File,
    pub file_name: String,
    pub length: u64,
}

#[async_trait::async_trait]
pub trait IReportStore: Send + Sync {
    /// Entry point for an external report renderer; the service itself only serves reports.
    /// Write-once: storing a second report under the same id fails with `ReportExists`.
    async fn store_report(&self, report_id: &str, content: Vec<u8>) -> Result<(), StorageError>;
    async fn get_report(&self, report_id: &str) -> Result<Option<ReportFile>, StorageError>;
}
