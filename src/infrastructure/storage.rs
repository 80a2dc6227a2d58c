use crate::config::AppConfig;
use crate::services::storage::{PublicUrlStyle, S3StorageService};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the S3 client. Credentials come from the default provider chain.
pub async fn setup_storage(config: &AppConfig) -> Arc<S3StorageService> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));
    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    info!(
        "☁️  S3 Storage: region={} bucket={} endpoint={}",
        config.aws_region,
        config.bucket,
        config.endpoint_url.as_deref().unwrap_or("aws")
    );

    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is reachable", config.bucket),
        Err(e) => warn!(
            "⚠️  Bucket '{}' is not reachable yet, uploads will fail until it is: {}",
            config.bucket,
            aws_sdk_s3::error::DisplayErrorContext(&e)
        ),
    }

    Arc::new(S3StorageService::new(
        s3_client,
        config.bucket.clone(),
        PublicUrlStyle::from_config(config),
        config.public_read,
    ))
}
