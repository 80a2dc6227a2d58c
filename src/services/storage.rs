use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::AppConfig;

/// Characters left as-is inside a key path segment
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An object as reported by the store's listing
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: i64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Stores `data` under `key` and returns the object's public URL.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    /// Lists at most `max_keys` objects whose key starts with `prefix`.
    async fn list_objects(&self, prefix: &str, max_keys: i32) -> Result<Vec<RemoteObject>>;

    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;
}

/// How public object URLs are built for a bucket
#[derive(Debug, Clone, PartialEq)]
pub enum PublicUrlStyle {
    /// `<base>/<key>`
    BaseUrl(String),
    /// `<endpoint>/<bucket>/<key>`
    PathStyle { endpoint: String, bucket: String },
    /// `https://<bucket>.s3[.<region>].amazonaws.com/<key>`
    VirtualHosted { bucket: String, region: String },
}

impl PublicUrlStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        if let Some(base) = &config.public_base_url {
            PublicUrlStyle::BaseUrl(base.clone())
        } else if let Some(endpoint) = &config.endpoint_url {
            PublicUrlStyle::PathStyle {
                endpoint: endpoint.clone(),
                bucket: config.bucket.clone(),
            }
        } else {
            PublicUrlStyle::VirtualHosted {
                bucket: config.bucket.clone(),
                region: config.aws_region.clone(),
            }
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        let encoded = encode_key(key);
        match self {
            PublicUrlStyle::BaseUrl(base) => format!("{}/{}", base, encoded),
            PublicUrlStyle::PathStyle { endpoint, bucket } => {
                format!("{}/{}/{}", endpoint, bucket, encoded)
            }
            PublicUrlStyle::VirtualHosted { bucket, region } if region == "us-east-1" => {
                format!("https://{}.s3.amazonaws.com/{}", bucket, encoded)
            }
            PublicUrlStyle::VirtualHosted { bucket, region } => {
                format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, encoded)
            }
        }
    }
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
    url_style: PublicUrlStyle,
    public_read: bool,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, url_style: PublicUrlStyle, public_read: bool) -> Self {
        Self {
            client,
            bucket,
            url_style,
            public_read,
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        if let Err(e) = request.send().await {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={}",
                self.bucket,
                key,
                DisplayErrorContext(&e)
            );
            return Err(anyhow::anyhow!(sdk_error_message(&e)));
        }

        Ok(self.public_url(key))
    }

    async fn list_objects(&self, prefix: &str, max_keys: i32) -> Result<Vec<RemoteObject>> {
        let res = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await?;

        let objects = res
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| {
                let key = object.key?;
                let last_modified = object.last_modified.and_then(|d| {
                    DateTime::<Utc>::from_timestamp(d.secs(), d.subsec_nanos())
                });
                Some(RemoteObject {
                    key,
                    last_modified,
                    size: object.size.unwrap_or(0),
                })
            })
            .collect();

        Ok(objects)
    }

    fn public_url(&self, key: &str) -> String {
        self.url_style.url_for(key)
    }
}

/// The store's own error message when it sent one, else the full error chain.
fn sdk_error_message<E, R>(e: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    e.as_service_error()
        .and_then(|service| service.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(e).to_string())
}
