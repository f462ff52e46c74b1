use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use axum::{
    extract::{ConnectInfo, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use intake_common::{
    dtos::UploadResponseDto,
    models::{allowed_extensions, FileKind},
};
use tracing::{error, info, warn};

use crate::{
    dispatcher::{ScheduleError, ScheduledJob},
    error::ApiError,
    state::Services,
};

pub fn create_route(services: Services) -> Router {
    let body_limit = services.settings.max_upload_bytes;
    Router::new()
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(services)
}

/// Stores the first file part of the request and queues it for processing.
#[tracing::instrument(skip(services, multipart))]
pub async fn upload(State(services): State<Services>, connect_info: Option<ConnectInfo<SocketAddr>>, mut multipart: Multipart) -> Result<Json<UploadResponseDto>, ApiError> {
    let client = connect_info.map(|ConnectInfo(addr)| addr.ip());
    if !services.upload_rate_limiter.check(client) {
        warn!("Upload rate exceeded for {:?}", client);
        return Err(ApiError::RateLimited);
    }

    while let Some(field) = multipart.next_field().await.map_err(|err| ApiError::Multipart(err.to_string()))? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let kind = FileKind::from_filename(&file_name).ok_or_else(|| ApiError::UnsupportedExtension { allowed: allowed_extensions() })?;

        let job = services.job_persistence.create(kind).await?;
        let source_path = services.upload_storage.path_for(&job);
        let pending = PendingUpload::new(services.clone(), &job.id, source_path.clone());
        let written = match services.upload_storage.store(&job, field).await {
            Ok(written) => written,
            Err(err) => {
                pending.fail(&err.to_string()).await;
                return Err(err.into());
            }
        };
        info!("Stored '{}' as job {} ({} bytes)", &file_name, &job.id, written);

        let scheduled = ScheduledJob {
            job_id: job.id.clone(),
            kind,
            source_path,
        };
        if let Err(err) = services.dispatcher.schedule(scheduled) {
            warn!("Could not schedule job {}: {}", &job.id, &err);
            pending.fail(&err.to_string()).await;
            return Err(match err {
                ScheduleError::QueueFull => ApiError::QueueFull,
                ScheduleError::Closed => ApiError::Unavailable,
            });
        }

        pending.disarm();
        return Ok(Json(UploadResponseDto::processing_started(&job.id)));
    }
    Err(ApiError::MissingFile)
}

pub const INTERRUPTED_UPLOAD_MESSAGE: &str = "upload interrupted before it was fully received";

/// A created job whose upload has not been handed to the dispatcher yet.
/// Dropping it while armed (request timed out, client went away) fails the job and deletes the partial file.
struct PendingUpload {
    services: Services,
    job_id: String,
    source_path: PathBuf,
    armed: bool,
}

impl PendingUpload {
    fn new(services: Services, job_id: &str, source_path: PathBuf) -> Self {
        PendingUpload {
            services,
            job_id: job_id.to_string(),
            source_path,
            armed: true,
        }
    }

    async fn fail(mut self, message: &str) {
        self.armed = false;
        discard(&self.services, &self.job_id, &self.source_path, message).await;
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Upload for job {} was abandoned", &self.job_id);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!("No runtime left to clean up job {}", &self.job_id);
            return;
        };
        let services = self.services.clone();
        let job_id = std::mem::take(&mut self.job_id);
        let source_path = std::mem::take(&mut self.source_path);
        runtime.spawn(async move { discard(&services, &job_id, &source_path, INTERRUPTED_UPLOAD_MESSAGE).await });
    }
}

async fn discard(services: &Services, job_id: &str, source_path: &Path, message: &str) {
    if let Err(err) = services.job_persistence.set_error(job_id, message).await {
        error!("Could not mark job {} failed: {}", job_id, err);
    }
    services.upload_storage.remove(source_path).await;
}
