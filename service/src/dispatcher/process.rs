use std::sync::Arc;

use intake_common::{
    error::ProcessError,
    extract::ExtractionStrategies,
    persistence::{IJobPersistence, IResultStore, UploadStorage},
    validate::{IBatchValidator, ValidationOutcome},
};
use tracing::{error, info};

use super::{panic_message, IWorker, ScheduledJob};

/// Extract → validate → persist for one upload.
pub struct ProcessService {
    pub job_persistence: Arc<dyn IJobPersistence>,
    pub result_store: Arc<dyn IResultStore>,
    pub upload_storage: Arc<UploadStorage>,
    pub strategies: ExtractionStrategies,
    pub validator: Arc<dyn IBatchValidator>,
    pub keep_uploads: bool,
}

impl ProcessService {
    async fn run_pipeline(&self, job: &ScheduledJob) -> Result<ValidationOutcome, ProcessError> {
        let extractor = self.strategies.select(job.kind);
        let validator = self.validator.clone();
        let source_path = job.source_path.clone();
        let job_id = job.job_id.clone();
        let task = tokio::spawn(async move {
            let records = extractor.extract(&source_path).await?;
            info!("Extracted {} records from job {}", records.len(), &job_id);
            Ok::<_, ProcessError>(validator.process_batch(records).await?)
        });
        match task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => Err(ProcessError::Panicked(panic_message(err.into_panic().as_ref()))),
            Err(err) => Err(ProcessError::Panicked(err.to_string())),
        }
    }

    async fn ready(&self, job_id: &str, outcome: ValidationOutcome) {
        if let Err(err) = self.result_store.put_result(job_id, &outcome).await {
            self.error(job_id, &ProcessError::from(err)).await;
            return;
        }
        match self.job_persistence.set_ready(job_id).await {
            Ok(()) => info!("Job {} completed", job_id),
            Err(err) => error!("Could not mark job {} completed: {}", job_id, err),
        }
    }

    async fn error(&self, job_id: &str, err: &ProcessError) {
        error!("Job {} failed: {}", job_id, err);
        if let Err(err) = self.job_persistence.set_error(job_id, &err.to_string()).await {
            error!("Could not mark job {} failed: {}", job_id, err);
        }
    }
}

#[async_trait::async_trait]
impl IWorker for ProcessService {
    #[tracing::instrument(skip(self, job), fields(job_id = %job.job_id))]
    async fn process(&self, job: ScheduledJob) {
        match self.job_persistence.set_processing(&job.job_id).await {
            Ok(_) => match self.run_pipeline(&job).await {
                Ok(outcome) => self.ready(&job.job_id, outcome).await,
                Err(err) => self.error(&job.job_id, &err).await,
            },
            Err(err) => error!("Could not start job {}: {}", &job.job_id, err),
        }
        if !self.keep_uploads {
            self.upload_storage.remove(&job.source_path).await;
        }
    }
}
