use std::env;
use std::path::PathBuf;

/// Runtime configuration, built once at startup and handed to the services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (default: 3000)
    pub port: u16,

    /// AWS region of the bucket (default: "us-east-1")
    pub aws_region: String,

    /// Target bucket name
    pub bucket: String,

    /// Custom S3 endpoint (MinIO, LocalStack, ...). Enables path-style addressing.
    pub endpoint_url: Option<String>,

    /// Base URL used to build public object links instead of the derived S3 URL
    pub public_base_url: Option<String>,

    /// Store objects with the `public-read` canned ACL (default: true)
    pub public_read: bool,

    /// Scratch directory for staged uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory served as the landing page (default: "public")
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            aws_region: "us-east-1".to_string(),
            bucket: "your-bucket-name".to_string(),
            endpoint_url: None,
            public_base_url: None,
            public_read: true,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("public"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            aws_region: env::var("AWS_REGION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.aws_region),

            bucket: env::var("S3_BUCKET_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.bucket),

            endpoint_url: non_empty_var("S3_ENDPOINT_URL"),
            public_base_url: non_empty_var("PUBLIC_BASE_URL"),

            public_read: env::var("S3_PUBLIC_READ")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.public_read),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}
