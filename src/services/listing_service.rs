use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::AppError;
use crate::services::storage::StorageService;
use crate::services::upload_service::IMAGE_KEY_PREFIX;

/// Maximum number of images returned by a listing
pub const LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub key: String,
    pub url: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: i64,
}

pub struct ListingService {
    storage: Arc<dyn StorageService>,
    prefix: String,
    limit: usize,
}

impl ListingService {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self {
            storage,
            prefix: IMAGE_KEY_PREFIX.to_string(),
            limit: LIST_LIMIT,
        }
    }

    /// Lists stored images in the store's own order, capped at [`LIST_LIMIT`].
    pub async fn list_images(&self) -> Result<Vec<ImageSummary>, AppError> {
        let objects = self
            .storage
            .list_objects(&self.prefix, self.limit as i32)
            .await
            .map_err(AppError::ListFailed)?;

        Ok(objects
            .into_iter()
            .take(self.limit)
            .map(|object| ImageSummary {
                url: self.storage.public_url(&object.key),
                key: object.key,
                last_modified: object.last_modified,
                size: object.size,
            })
            .collect())
    }
}
