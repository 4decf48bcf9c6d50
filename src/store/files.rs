//! Disk-backed file store for uploaded and generated images

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::codec;
use crate::error::{AppError, Result};
use crate::store::traits::{FileStore, StoredFile};

/// Writes files under a base directory and hands back URLs under the
/// configured public prefix.
pub struct DiskFileStore {
    storage_path: PathBuf,
    url_prefix: String,
}

impl DiskFileStore {
    pub fn new(storage_path: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    async fn ensure_storage_dir(&self) -> Result<()> {
        if !self.storage_path.exists() {
            fs::create_dir_all(&self.storage_path)
                .await
                .map_err(AppError::Io)?;
            debug!(path = ?self.storage_path, "Created storage directory");
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn save(&self, bytes: &[u8]) -> Result<StoredFile> {
        self.ensure_storage_dir().await?;

        let format = codec::detect_image_format(bytes).unwrap_or("png");
        let filename = format!("{}.{}", Uuid::new_v4(), format);
        let file_path = self.storage_path.join(&filename);

        fs::write(&file_path, bytes).await.map_err(AppError::Io)?;
        debug!(path = ?file_path, size = bytes.len(), "Saved image file");

        Ok(StoredFile {
            id: filename.clone(),
            url: format!("{}/{}", self.url_prefix, filename),
        })
    }

    async fn read(&self, id: &str) -> Result<Vec<u8>> {
        fs::read(self.storage_path.join(id)).await.map_err(AppError::Io)
    }
}
