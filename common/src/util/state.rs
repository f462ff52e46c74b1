use std::{num::NonZeroU32, path::{Path, PathBuf}, sync::Arc, time::Duration};

use tokio::fs;
use tracing::info;

use crate::{
    error::StorageError,
    persistence::{FileJobPersistence, FileReportStore, FileResultStore, IJobPersistence, IReportStore, IResultStore, UploadStorage},
};

/// Runtime settings, read from the environment by the service binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    pub parallelism: usize,
    pub queue_capacity: usize,
    pub upload_rate_per_minute: NonZeroU32,
    pub status_rate_per_minute: NonZeroU32,
    pub max_upload_bytes: usize,
    pub keep_uploads: bool,
    pub validator_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: 8000,
            data_dir: PathBuf::from("."),
            parallelism: 10,
            queue_capacity: 1000,
            upload_rate_per_minute: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            status_rate_per_minute: NonZeroU32::new(60).unwrap_or(NonZeroU32::MIN),
            max_upload_bytes: 50 * 1024 * 1024,
            keep_uploads: false,
            validator_url: None,
            request_timeout: Duration::from_secs(59),
        }
    }
}

pub struct StorageServiceCollection {
    pub job_persistence: Arc<dyn IJobPersistence>,
    pub result_store: Arc<dyn IResultStore>,
    pub report_store: Arc<dyn IReportStore>,
    pub upload_storage: Arc<UploadStorage>,
}

impl StorageServiceCollection {
    /// Creates `jobs/`, `results/`, `reports/` and `uploads/` under `data_dir` and wires the stores on top.
    pub async fn build(data_dir: &Path) -> Result<Self, StorageError> {
        let jobs = data_dir.join("jobs");
        let results = data_dir.join("results");
        let reports = data_dir.join("reports");
        let uploads = data_dir.join("uploads");
        for dir in [&jobs, &results, &reports, &uploads] {
            fs::create_dir_all(dir).await?;
        }
        info!("Storing data under {}", data_dir.display());

        let job_persistence: Arc<dyn IJobPersistence> = Arc::new(FileJobPersistence::new(jobs));
        Ok(StorageServiceCollection {
            result_store: Arc::new(FileResultStore::new(results, job_persistence.clone())),
            report_store: Arc::new(FileReportStore::new(reports)),
            upload_storage: Arc::new(UploadStorage::new(uploads)),
            job_persistence,
        })
    }
}
