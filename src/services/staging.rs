use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::utils::validation::{ValidationError, validate_file_size};

/// Prefix shared by every generated file name
pub const FILE_NAME_PREFIX: &str = "img_";

const MAX_NAME_ATTEMPTS: usize = 3;
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Upload rejected: {0}")]
    TooLarge(#[source] ValidationError),

    #[error("Failed to read upload stream: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write scratch file: {0}")]
    Write(#[source] io::Error),
}

/// Builds a collision-resistant name: `img_<unix millis>-<random>` plus the
/// original extension.
pub fn generate_file_name(original_filename: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: u64 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!(
        "{}{}-{}{}",
        FILE_NAME_PREFIX,
        timestamp,
        suffix,
        extension_of(original_filename)
    )
}

/// Returns the extension of the base name including its dot, or an empty string.
fn extension_of(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 && !base[..idx].chars().all(|c| c == '.') => {
            let ext = &base[idx..];
            if ext.len() > 1 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
                ext
            } else {
                ""
            }
        }
        _ => "",
    }
}

/// An upload written to scratch storage.
///
/// The file is removed exactly once: through [`StagedFile::discard`], or on
/// drop if the request ends before discard runs.
#[derive(Debug)]
pub struct StagedFile {
    file_name: String,
    path: PathBuf,
    size: usize,
    removed: bool,
}

impl StagedFile {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub async fn read_all(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }

    pub async fn discard(mut self) -> io::Result<()> {
        self.removed = true;
        fs::remove_file(&self.path).await
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.removed {
            self.removed = true;
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove orphaned scratch file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Writes incoming upload streams into the scratch directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
    max_size: usize,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>, max_size: usize) -> Self {
        Self {
            dir: dir.into(),
            max_size,
        }
    }

    pub async fn stage<R>(
        &self,
        original_filename: &str,
        mut reader: R,
    ) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let (mut file, mut staged) = self.create(original_filename).await?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer).await.map_err(StagingError::Read)?;
            if n == 0 {
                break;
            }

            if let Err(e) = validate_file_size(staged.size + n, self.max_size) {
                tracing::warn!(
                    "Aborting staging of {} after {} bytes: {}",
                    staged.file_name,
                    staged.size,
                    e
                );
                drop(file);
                // Dropping `staged` removes the partial file.
                return Err(StagingError::TooLarge(e));
            }

            file.write_all(&buffer[..n])
                .await
                .map_err(StagingError::Write)?;
            staged.size += n;
        }

        file.flush().await.map_err(StagingError::Write)?;

        tracing::debug!(
            "Staged {} ({} bytes) at {:?}",
            staged.file_name,
            staged.size,
            staged.path
        );
        Ok(staged)
    }

    async fn create(&self, original_filename: &str) -> Result<(fs::File, StagedFile), StagingError> {
        let mut last_err = None;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = generate_file_name(original_filename);
            let path = self.dir.join(&file_name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    let path = fs::canonicalize(&path).await.unwrap_or(path);
                    return Ok((
                        file,
                        StagedFile {
                            file_name,
                            path,
                            size: 0,
                            removed: false,
                        },
                    ));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!("Scratch name collision on {}, regenerating", file_name);
                    last_err = Some(e);
                }
                Err(e) => return Err(StagingError::Write(e)),
            }
        }

        Err(StagingError::Write(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AlreadyExists, "no free scratch file name")
        })))
    }
}
