use thiserror::Error;

/// Maximum accepted image size: 5 MiB
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Image media types accepted for upload
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        });
    }
    Ok(())
}

/// Validates the declared MIME type against the image allowlist and returns
/// it normalized (parameters dropped, lowercased).
///
/// Only the declared type is checked; the bytes themselves are not sniffed.
pub fn validate_mime_type(content_type: Option<&str>) -> Result<String, ValidationError> {
    let normalized = content_type
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if ALLOWED_IMAGE_TYPES.contains(&normalized.as_str()) {
        return Ok(normalized);
    }

    tracing::debug!("Rejected declared content type: {:?}", content_type);
    Err(ValidationError {
        code: "INVALID_MIME_TYPE",
        message: "Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed."
            .to_string(),
    })
}
