use std::{io::ErrorKind, path::PathBuf};

use tokio::fs::File;
use tracing::info;

use super::{fs::write_new, IReportStore, ReportFile};
use crate::{error::StorageError, util::random::is_safe_identifier};

/// Rendered reports as `reports/<report id>.pdf`.
pub struct FileReportStore {
    directory: PathBuf,
}

impl FileReportStore {
    pub fn new(directory: PathBuf) -> Self {
        FileReportStore { directory }
    }

    fn path(&self, report_id: &str) -> PathBuf {
        self.directory.join(format!("{}.pdf", report_id))
    }
}

pub fn report_file_name(report_id: &str) -> String {
    format!("validation_report_{}.pdf", report_id)
}

#[async_trait::async_trait]
impl IReportStore for FileReportStore {
    /// Called by whatever renders reports; nothing in the upload pipeline writes here.
    async fn store_report(&self, report_id: &str, content: Vec<u8>) -> Result<(), StorageError> {
        if !is_safe_identifier(report_id) {
            return Err(StorageError::InvalidIdentifier(report_id.to_string()));
        }
        if !write_new(&self.path(report_id), &content).await? {
            return Err(StorageError::ReportExists(report_id.to_string()));
        }
        info!("Stored report {} ({} KiB)", report_id, content.len() / 1024);
        Ok(())
    }

    async fn get_report(&self, report_id: &str) -> Result<Option<ReportFile>, StorageError> {
        if !is_safe_identifier(report_id) {
            return Ok(None);
        }
        let file = match File::open(self.path(report_id)).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let length = file.metadata().await?.len();
        Ok(Some(ReportFile {
            file,
            file_name: report_file_name(report_id),
            length,
        }))
    }
}
