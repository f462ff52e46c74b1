use std::{sync::Arc, time::Instant};

use intake_common::{
    extract::ExtractionStrategies,
    persistence::{IJobPersistence, IReportStore, IResultStore, UploadStorage},
    util::state::{Settings, StorageServiceCollection},
    validate::{HttpBatchValidator, IBatchValidator, StructuralValidator},
};
use tracing::{info, warn};

use crate::{
    dispatcher::{Dispatcher, ProcessService},
    error::StartupError,
    rate_limit::ClientRateLimiter,
};

pub const INTERRUPTED_MESSAGE: &str = "processing interrupted by service restart";

pub type Services = Arc<ServiceCollection>;

pub struct ServiceCollection {
    pub settings: Settings,
    pub job_persistence: Arc<dyn IJobPersistence>,
    pub result_store: Arc<dyn IResultStore>,
    pub report_store: Arc<dyn IReportStore>,
    pub upload_storage: Arc<UploadStorage>,
    pub dispatcher: Dispatcher,
    pub upload_rate_limiter: ClientRateLimiter,
    pub status_rate_limiter: ClientRateLimiter,
    pub started: Instant,
}

impl ServiceCollection {
    pub async fn build(settings: Settings) -> Result<Services, StartupError> {
        let validator: Arc<dyn IBatchValidator> = match &settings.validator_url {
            Some(url) => {
                info!("Validating batches with {}", url);
                Arc::new(HttpBatchValidator::new(url)?)
            }
            None => Arc::new(StructuralValidator),
        };
        Self::build_with(settings, ExtractionStrategies::default(), validator).await
    }

    /// Wires the collection around the given collaborators and starts the worker pool.
    pub async fn build_with(settings: Settings, strategies: ExtractionStrategies, validator: Arc<dyn IBatchValidator>) -> Result<Services, StartupError> {
        let storage = StorageServiceCollection::build(&settings.data_dir).await?;
        fail_interrupted_jobs(&storage, settings.keep_uploads).await?;

        let worker = ProcessService {
            job_persistence: storage.job_persistence.clone(),
            result_store: storage.result_store.clone(),
            upload_storage: storage.upload_storage.clone(),
            strategies,
            validator,
            keep_uploads: settings.keep_uploads,
        };
        let dispatcher = Dispatcher::start(Arc::new(worker), settings.parallelism, settings.queue_capacity);

        Ok(Arc::new(ServiceCollection {
            upload_rate_limiter: ClientRateLimiter::per_minute(settings.upload_rate_per_minute),
            status_rate_limiter: ClientRateLimiter::per_minute(settings.status_rate_per_minute),
            job_persistence: storage.job_persistence,
            result_store: storage.result_store,
            report_store: storage.report_store,
            upload_storage: storage.upload_storage,
            dispatcher,
            started: Instant::now(),
            settings,
        }))
    }
}

/// Jobs still queued or running when the last process stopped will never finish on their own.
async fn fail_interrupted_jobs(storage: &StorageServiceCollection, keep_uploads: bool) -> Result<(), StartupError> {
    let unfinished = storage.job_persistence.unfinished().await?;
    for job in &unfinished {
        warn!("Job {} was {} at shutdown, marking it failed", &job.id, job.status.as_str());
        storage.job_persistence.set_error(&job.id, INTERRUPTED_MESSAGE).await?;
        if !keep_uploads {
            storage.upload_storage.remove(&storage.upload_storage.path_for(job)).await;
        }
    }
    if !unfinished.is_empty() {
        info!("Marked {} interrupted jobs as failed", unfinished.len());
    }
    Ok(())
}
