use std::sync::Arc;

use tokio::io::AsyncRead;

use crate::api::error::AppError;
use crate::services::staging::{StagedFile, Stager, StagingError};
use crate::services::storage::StorageService;
use crate::utils::validation::{MAX_FILE_SIZE, validate_mime_type};

/// Key prefix grouping every uploaded image in the bucket
pub const IMAGE_KEY_PREFIX: &str = "images/";

/// A completed upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file_name: String,
    pub key: String,
    pub url: String,
    pub size: usize,
}

/// Runs the upload pipeline: validate, stage, transfer, clean up.
pub struct UploadService {
    stager: Stager,
    storage: Arc<dyn StorageService>,
    key_prefix: String,
}

impl UploadService {
    pub fn new(stager: Stager, storage: Arc<dyn StorageService>) -> Self {
        Self {
            stager,
            storage,
            key_prefix: IMAGE_KEY_PREFIX.to_string(),
        }
    }

    pub async fn upload_image<R>(
        &self,
        original_filename: &str,
        content_type: Option<&str>,
        reader: R,
    ) -> Result<UploadOutcome, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        // Nothing touches the disk before the declared type passes.
        let content_type =
            validate_mime_type(content_type).map_err(|e| AppError::InvalidFileType(e.message))?;

        let staged = self
            .stager
            .stage(original_filename, reader)
            .await
            .map_err(staging_error)?;

        let file_name = staged.file_name().to_string();
        let size = staged.size();
        let key = format!("{}{}", self.key_prefix, file_name);

        let transfer = self.transfer(&staged, &key, &content_type).await;

        let path = staged.path().to_path_buf();
        if let Err(e) = staged.discard().await {
            tracing::warn!("Failed to remove scratch file {:?}: {}", path, e);
        }

        match transfer {
            Ok(url) => {
                tracing::info!("☁️  Uploaded {} ({} bytes) to {}", original_filename, size, key);
                Ok(UploadOutcome {
                    file_name,
                    key,
                    url,
                    size,
                })
            }
            Err(e) => {
                tracing::error!("Upload error for {}: {:?}", key, e);
                Err(AppError::UploadFailed(e.to_string()))
            }
        }
    }

    async fn transfer(
        &self,
        staged: &StagedFile,
        key: &str,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let data = staged.read_all().await?;
        self.storage.put_object(key, data, content_type).await
    }
}

fn staging_error(e: StagingError) -> AppError {
    match e {
        StagingError::TooLarge(_) => AppError::FileTooLarge(format!(
            "File exceeds the maximum allowed size of {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        )),
        StagingError::Read(io) if io.kind() == std::io::ErrorKind::FileTooLarge => {
            AppError::FileTooLarge("Request body exceeds the maximum allowed limit".to_string())
        }
        StagingError::Read(io) => AppError::BadRequest(io.to_string()),
        StagingError::Write(io) => AppError::UploadFailed(io.to_string()),
    }
}
