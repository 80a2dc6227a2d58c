use crate::AppState;
use crate::api::error::AppError;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

#[derive(ToSchema)]
pub struct UploadForm {
    /// JPEG, PNG, GIF or WebP image, at most 5 MB
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub image_url: String,
    pub file_name: String,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file uploaded or invalid file type"),
        (status = 413, description = "Image exceeds the size limit"),
        (status = 500, description = "Transfer to the object store failed")
    ),
    tag = "images"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!("Upload without a multipart body: {}", rejection);
            return Err(AppError::NoFile);
        }
    };

    let result: Result<Json<UploadResponse>, AppError> = async {
        let mut uploaded = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            // An unselected file input still arrives as a part with an empty filename.
            let is_image = field.name() == Some(IMAGE_FIELD)
                && field.file_name().is_some_and(|name| !name.is_empty());
            if !is_image || uploaded.is_some() {
                continue;
            }

            let original_filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(|s| s.to_string());
            let reader = StreamReader::new(field.map_err(body_error));

            uploaded = Some(
                state
                    .upload_service
                    .upload_image(&original_filename, content_type.as_deref(), reader)
                    .await?,
            );
        }

        let outcome = uploaded.ok_or(AppError::NoFile)?;

        Ok(Json(UploadResponse {
            success: true,
            message: "Image uploaded successfully".to_string(),
            image_url: outcome.url,
            file_name: outcome.file_name,
        }))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Consume the rest of the body so the client sees the response instead of a reset.
            if e.is_input_error() {
                tracing::warn!("Upload rejected: {}. Consuming remaining stream...", e);
            }
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

fn body_error(e: MultipartError) -> std::io::Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        std::io::Error::new(std::io::ErrorKind::FileTooLarge, e.body_text())
    } else {
        std::io::Error::other(e)
    }
}
