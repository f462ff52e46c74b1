use std::{fmt::Display, path::{Path, PathBuf}};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;

use crate::{error::StorageError, models::JobModel};

/// Raw uploaded files, stored as `uploads/<job id><extension>` until their job is processed.
#[derive(Debug)]
pub struct UploadStorage {
    directory: PathBuf,
}

impl UploadStorage {
    pub fn new(directory: PathBuf) -> Self {
        UploadStorage { directory }
    }

    pub fn path_for(&self, job: &JobModel) -> PathBuf {
        self.directory.join(&job.source_file)
    }

    /// Writes the whole stream to disk and syncs it. A partially written file is removed on failure.
    pub async fn store<S, E>(&self, job: &JobModel, source: S) -> Result<u64, StorageError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display,
    {
        futures::pin_mut!(source);
        let path = self.path_for(job);
        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&path).await?;
        let mut written = 0u64;
        let result: Result<(), StorageError> = async {
            while let Some(chunk) = source.next().await {
                let chunk = chunk.map_err(|err| StorageError::Upload(err.to_string()))?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.sync_all().await?;
            Ok(())
        }
        .await;
        if let Err(err) = result {
            drop(file);
            self.remove(&path).await;
            return Err(err);
        }
        Ok(written)
    }

    /// Deletes a stored upload. A file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("Error occured, while deleting upload {}: {}", path.display(), &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileKind;
    use futures::stream;
    use std::io;

    #[tokio::test]
    async fn stores_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStorage::new(dir.path().to_path_buf());
        let job = JobModel::new("job1".to_string(), FileKind::Csv);
        let chunks = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"npi,name\n")), Ok(Bytes::from_static(b"1234567893,Ada\n"))]);

        let written = uploads.store(&job, chunks).await.unwrap();

        assert_eq!(written, 24);
        assert_eq!(fs::read(dir.path().join("job1.csv")).await.unwrap(), b"npi,name\n1234567893,Ada\n");
    }

    #[tokio::test]
    async fn broken_stream_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStorage::new(dir.path().to_path_buf());
        let job = JobModel::new("job2".to_string(), FileKind::Pdf);
        let chunks = stream::iter(vec![Ok(Bytes::from_static(b"%PDF")), Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"))]);

        let result = uploads.store(&job, chunks).await;

        assert!(matches!(result, Err(StorageError::Upload(_))));
        assert!(!dir.path().join("job2.pdf").exists());
    }

    #[tokio::test]
    async fn removing_a_missing_upload_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStorage::new(dir.path().to_path_buf());
        let job = JobModel::new("job3".to_string(), FileKind::Csv);
        fs::write(uploads.path_for(&job), b"npi\n").await.unwrap();

        uploads.remove(&uploads.path_for(&job)).await;
        uploads.remove(&uploads.path_for(&job)).await;

        assert!(!uploads.path_for(&job).exists());
    }
}
