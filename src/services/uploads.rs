// src/services/uploads.rs
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stages uploaded files on disk for the lifetime of a single request.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stream a multipart field to a fresh file. The returned guard removes
    /// the file when dropped, including when this call fails part-way.
    pub async fn stage(&self, mut field: Field<'_>) -> Result<StagedUpload, UploadError> {
        fs::create_dir_all(&self.dir).await?;

        let mut staged = StagedUpload {
            path: self.dir.join(format!("{}.pdf", Uuid::new_v4())),
            len: 0,
        };
        let mut file = fs::File::create(&staged.path).await?;

        while let Some(chunk) = field.chunk().await? {
            staged.len += chunk.len();
            if staged.len > self.max_bytes {
                return Err(UploadError::TooLarge { limit: self.max_bytes });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(bytes = staged.len, path = %staged.path.display(), "upload staged");
        Ok(staged)
    }

    #[cfg(test)]
    pub(crate) async fn stage_bytes(&self, data: &[u8]) -> Result<StagedUpload, UploadError> {
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge { limit: self.max_bytes });
        }
        fs::create_dir_all(&self.dir).await?;

        let staged = StagedUpload {
            path: self.dir.join(format!("{}.pdf", Uuid::new_v4())),
            len: data.len(),
        };
        fs::write(&staged.path, data).await?;
        Ok(staged)
    }
}

/// A file on disk that lives exactly as long as this value.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    len: usize,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        // Drop cannot await. Unlinking one file is a short blocking call.
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "upload removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(path = %self.path.display(), "failed to remove upload: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn staged_file_is_removed_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"), 1024);

        let staged = store.stage_bytes(b"%PDF-1.4").await.unwrap();
        assert!(staged.path().exists());
        assert_eq!(staged.read().await.unwrap(), b"%PDF-1.4");
        assert_eq!(entries(store.dir()), 1);

        drop(staged);
        assert_eq!(entries(store.dir()), 0);
    }

    #[tokio::test]
    async fn oversize_bytes_are_rejected_without_touching_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"), 4);

        let err = store.stage_bytes(b"too long").await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 4 }));
        assert_eq!(entries(store.dir()), 0);
    }
}
