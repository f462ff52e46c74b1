use std::{io::ErrorKind, path::{Path, PathBuf}};

use tokio::{fs, io::AsyncWriteExt};

use crate::{error::StorageError, util::random::generate_token};

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or("artifact");
    path.with_file_name(format!(".{}.{}.tmp", name, generate_token()))
}

async fn write_temp(path: &Path, content: &[u8]) -> Result<PathBuf, StorageError> {
    let temp = temp_sibling(path);
    let mut file = fs::File::create(&temp).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(temp)
}

/// Replaces `path` in one step, so readers see either the old or the new content.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let temp = write_temp(path, content).await?;
    if let Err(err) = fs::rename(&temp, path).await {
        _ = fs::remove_file(&temp).await;
        return Err(err.into());
    }
    Ok(())
}

/// Publishes `content` at `path` only if nothing is there yet. Returns `false` when `path` exists.
pub(crate) async fn write_new(path: &Path, content: &[u8]) -> Result<bool, StorageError> {
    let temp = write_temp(path, content).await?;
    let linked = fs::hard_link(&temp, path).await;
    _ = fs::remove_file(&temp).await;
    match linked {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_new_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");

        assert!(write_new(&path, b"first").await.unwrap());
        assert!(!write_new(&path, b"second").await.unwrap());
        assert_eq!(fs::read(&path).await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn atomic_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.json");

        write_atomic(&path, b"one").await.unwrap();
        write_atomic(&path, b"two").await.unwrap();
        write_new(&dir.path().join("c.json"), b"three").await.unwrap();

        assert_eq!(read_optional(&path).await.unwrap().unwrap(), b"two");
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
    }

    #[tokio::test]
    async fn reading_a_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("missing")).await.unwrap().is_none());
    }
}
