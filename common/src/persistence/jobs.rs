use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use super::{fs::{read_optional, write_atomic, write_new}, IJobPersistence};
use crate::{
    error::StorageError,
    models::{FileKind, JobModel, JobStatus},
    util::random::{generate_token, is_safe_identifier},
};

/// Job status records as one JSON document per job under `jobs/`.
pub struct FileJobPersistence {
    directory: PathBuf,
}

impl FileJobPersistence {
    pub fn new(directory: PathBuf) -> Self {
        FileJobPersistence { directory }
    }

    fn path(&self, job_id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", job_id))
    }

    async fn load(&self, job_id: &str) -> Result<JobModel, StorageError> {
        self.get(job_id).await?.ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }

    async fn transition(&self, job_id: &str, to: JobStatus, message: Option<&str>) -> Result<JobModel, StorageError> {
        let mut job = self.load(job_id).await?;
        let allowed = match to {
            JobStatus::Processing => job.status == JobStatus::Accepted,
            JobStatus::Completed => job.status == JobStatus::Processing,
            JobStatus::Failed => !job.status.is_terminal(),
            JobStatus::Accepted => false,
        };
        if !allowed {
            return Err(StorageError::InvalidTransition {
                job_id: job_id.to_string(),
                from: job.status.as_str(),
                to: to.as_str(),
            });
        }
        job.status = to;
        if to.is_terminal() {
            job.finished = Some(Utc::now());
        }
        if let Some(message) = message {
            job.message = Some(message.to_string());
        }
        write_atomic(&self.path(job_id), &serde_json::to_vec(&job)?).await?;
        Ok(job)
    }
}

#[async_trait::async_trait]
impl IJobPersistence for FileJobPersistence {
    async fn create(&self, kind: FileKind) -> Result<JobModel, StorageError> {
        loop {
            let job = JobModel::new(generate_token(), kind);
            if write_new(&self.path(&job.id), &serde_json::to_vec(&job)?).await? {
                info!("Created job {}", &job.id);
                return Ok(job);
            }
            warn!("Token {} already issued, generating another", &job.id);
        }
    }

    async fn get(&self, job_id: &str) -> Result<Option<JobModel>, StorageError> {
        if !is_safe_identifier(job_id) {
            return Ok(None);
        }
        match read_optional(&self.path(job_id)).await? {
            Some(content) => Ok(Some(serde_json::from_slice(&content)?)),
            None => Ok(None),
        }
    }

    async fn set_processing(&self, job_id: &str) -> Result<JobModel, StorageError> {
        self.transition(job_id, JobStatus::Processing, None).await
    }

    async fn set_ready(&self, job_id: &str) -> Result<(), StorageError> {
        self.transition(job_id, JobStatus::Completed, None).await.map(|_| ())
    }

    async fn set_error(&self, job_id: &str, message: &str) -> Result<(), StorageError> {
        self.transition(job_id, JobStatus::Failed, Some(message)).await.map(|_| ())
    }

    async fn unfinished(&self) -> Result<Vec<JobModel>, StorageError> {
        let mut jobs = Vec::new();
        let mut entries = fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(job_id) = name.to_str().and_then(|name| name.strip_suffix(".json")) else {
                continue;
            };
            match self.get(job_id).await {
                Ok(Some(job)) if !job.status.is_terminal() => jobs.push(job),
                Ok(_) => {}
                Err(err) => warn!("Skipping unreadable job record {}: {}", job_id, err),
            }
        }
        Ok(jobs)
    }
}
