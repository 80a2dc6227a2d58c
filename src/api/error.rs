use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(#[source] anyhow::Error),
}

impl AppError {
    /// HTTP status carried by each error kind
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFile | AppError::InvalidFileType(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UploadFailed(_) | AppError::ListFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Input errors are the caller's fault and are never worth retrying as-is.
    pub fn is_input_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::NoFile => json!({ "error": "No file uploaded" }),
            AppError::InvalidFileType(msg) => json!({
                "error": "Invalid file type",
                "message": msg
            }),
            AppError::FileTooLarge(msg) => json!({
                "error": "File too large",
                "message": msg
            }),
            AppError::BadRequest(msg) => json!({
                "error": "Invalid upload request",
                "message": msg
            }),
            AppError::UploadFailed(msg) => json!({
                "error": "Upload failed",
                "message": msg
            }),
            AppError::ListFailed(e) => {
                tracing::error!("Error listing images: {:?}", e);
                json!({ "error": "Failed to retrieve images" })
            }
        };

        (status, Json(body)).into_response()
    }
}
