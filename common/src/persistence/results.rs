use std::{io, path::PathBuf, sync::Arc};

use serde_json::Value;

use super::{fs::{read_optional, write_atomic}, IJobPersistence, IResultStore, ResultLookup};
use crate::{error::StorageError, models::JobStatus, util::random::is_safe_identifier};

/// Validation outcomes as `results/<job id>.json`. Lookups go through the job record first.
pub struct FileResultStore {
    directory: PathBuf,
    jobs: Arc<dyn IJobPersistence>,
}

impl FileResultStore {
    pub fn new(directory: PathBuf, jobs: Arc<dyn IJobPersistence>) -> Self {
        FileResultStore { directory, jobs }
    }

    fn path(&self, job_id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", job_id))
    }
}

#[async_trait::async_trait]
impl IResultStore for FileResultStore {
    async fn put_result(&self, job_id: &str, result: &Value) -> Result<(), StorageError> {
        if !is_safe_identifier(job_id) {
            return Err(StorageError::InvalidIdentifier(job_id.to_string()));
        }
        write_atomic(&self.path(job_id), &serde_json::to_vec(result)?).await
    }

    async fn get_result(&self, job_id: &str) -> Result<ResultLookup, StorageError> {
        let Some(job) = self.jobs.get(job_id).await? else {
            return Ok(ResultLookup::NotFound);
        };
        match job.status {
            JobStatus::Accepted | JobStatus::Processing => Ok(ResultLookup::Pending(job)),
            JobStatus::Failed => Ok(ResultLookup::Failed(job)),
            JobStatus::Completed => match read_optional(&self.path(job_id)).await? {
                Some(content) => Ok(ResultLookup::Ready(serde_json::from_slice(&content)?)),
                None => Err(io::Error::new(io::ErrorKind::NotFound, format!("result for completed job {} is missing", job_id)).into()),
            },
        }
    }
}
