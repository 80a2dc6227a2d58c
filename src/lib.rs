pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::listing_service::ListingService;
use crate::services::staging::Stager;
use crate::services::storage::StorageService;
use crate::services::upload_service::UploadService;
use crate::utils::validation::MAX_FILE_SIZE;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Headroom above the file ceiling for multipart boundaries and headers
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::upload::upload_image,
        api::handlers::images::list_images,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::upload::UploadForm,
            api::handlers::upload::UploadResponse,
            api::handlers::images::ImageListResponse,
            services::listing_service::ImageSummary,
        )
    ),
    tags(
        (name = "images", description = "Image upload and listing"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upload_service: Arc<UploadService>,
    pub listing_service: Arc<ListingService>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn StorageService>) -> Self {
        let stager = Stager::new(config.upload_dir.clone(), MAX_FILE_SIZE);
        Self {
            upload_service: Arc::new(UploadService::new(stager, storage.clone())),
            listing_service: Arc::new(ListingService::new(storage)),
            config: Arc::new(config),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload",
            post(api::handlers::upload::upload_image)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/images", get(api::handlers::images::list_images))
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn(api::middleware::security::security_headers))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
