use crate::AppState;
use crate::api::error::AppError;
use crate::services::listing_service::ImageSummary;
use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ImageListResponse {
    pub images: Vec<ImageSummary>,
}

#[utoipa::path(
    get,
    path = "/images",
    responses(
        (status = 200, description = "Up to 50 stored images", body = ImageListResponse),
        (status = 500, description = "Failed to retrieve images")
    ),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<ImageListResponse>, AppError> {
    let images = state.listing_service.list_images().await?;
    Ok(Json(ImageListResponse { images }))
}
