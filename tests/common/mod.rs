#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use chrono::Utc;
use http_body_util::BodyExt;
use image_upload_service::config::AppConfig;
use image_upload_service::services::storage::{RemoteObject, StorageService};
use image_upload_service::{AppState, create_app};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub struct StoredObject {
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory store. Listing ignores `max_keys` so the service-side cap is exercised.
#[derive(Default)]
pub struct MockStorageService {
    pub objects: Mutex<Vec<StoredObject>>,
    pub fail_puts: Option<String>,
    pub fail_lists: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts(message: &str) -> Self {
        Self {
            fail_puts: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_lists() -> Self {
        Self {
            fail_lists: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, key: &str, size: usize) {
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            data: vec![0u8; size],
            content_type: "image/png".to_string(),
        });
    }

    pub fn count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<String> {
        if let Some(message) = &self.fail_puts {
            return Err(anyhow::anyhow!(message.clone()));
        }
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(self.public_url(key))
    }

    async fn list_objects(&self, prefix: &str, _max_keys: i32) -> anyhow::Result<Vec<RemoteObject>> {
        if self.fail_lists {
            return Err(anyhow::anyhow!("connection refused: mock-bucket.internal:443"));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.key.starts_with(prefix))
            .map(|o| RemoteObject {
                key: o.key.clone(),
                last_modified: Some(Utc::now()),
                size: o.data.len() as i64,
            })
            .collect())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://mock-bucket.s3.amazonaws.com/{}", key)
    }
}

pub struct TestApp {
    pub app: Router,
    pub storage: Arc<MockStorageService>,
    pub scratch: TempDir,
    pub static_dir: TempDir,
}

impl TestApp {
    pub fn new(storage: MockStorageService) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("image_upload_service=debug")
            .with_test_writer()
            .try_init();

        let scratch = tempfile::tempdir().unwrap();
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>Image Upload</body></html>",
        )
        .unwrap();

        let config = AppConfig {
            upload_dir: scratch.path().to_path_buf(),
            static_dir: static_dir.path().to_path_buf(),
            bucket: "mock-bucket".to_string(),
            ..AppConfig::default()
        };

        let storage = Arc::new(storage);
        let state = AppState::new(config, storage.clone());

        Self {
            app: create_app(state),
            storage,
            scratch,
            static_dir,
        }
    }

    pub fn scratch_files(&self) -> usize {
        count_files(self.scratch.path())
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// One file part of a multipart body, without the closing boundary.
pub fn file_field(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
        Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(data);
    part.extend_from_slice(b"\r\n");
    part
}

/// One text part of a multipart body, without the closing boundary.
pub fn text_field(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"{field}\"\r\n\r\n\
        {value}\r\n"
    )
    .into_bytes()
}

/// Joins parts into a complete multipart body.
pub fn form(parts: &[Vec<u8>]) -> Vec<u8> {
    let mut body = parts.concat();
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Builds a multipart body with a single file field.
pub fn file_part(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    form(&[file_field(field, filename, content_type, data)])
}

/// Builds a multipart body with a single text field.
pub fn text_part(field: &str, value: &str) -> Vec<u8> {
    form(&[text_field(field, value)])
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!("not JSON: {:?}", String::from_utf8_lossy(&body))
    })
}

/// Minimal PNG signature followed by filler bytes.
pub fn fake_png(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len, 0xAB);
    data
}
