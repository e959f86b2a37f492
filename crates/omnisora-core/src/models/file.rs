use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::error::{UploadError, UploadResult};

/// Where the bytes of a selected file live.
#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}

/// The file selected for one upload attempt.
///
/// `size` is the declared size captured at selection time. Reading the content back
/// at a different length is an error: the digests, the declared `Content-Length` and
/// the finalize metadata must all describe the same bytes.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    size: u64,
    mime_type: String,
    source: FileSource,
}

impl FileHandle {
    /// Build a handle over bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Memory(data),
        }
    }

    /// Build a handle from a file on disk.
    ///
    /// The MIME type is `mime_override` when given, otherwise guessed from the
    /// extension, otherwise empty.
    pub async fn from_path(path: &Path, mime_override: Option<String>) -> UploadResult<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| UploadError::FileRead(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(UploadError::InvalidInput(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UploadError::InvalidInput(format!("File name is not valid UTF-8: {}", path.display()))
            })?
            .to_string();

        let mime_type = mime_override
            .or_else(|| mime_guess::from_path(path).first().map(|m| m.to_string()))
            .unwrap_or_default();

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type as selected; may be empty.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// MIME type to declare on the wire, falling back to `application/octet-stream`.
    pub fn content_type(&self) -> &str {
        if self.mime_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.mime_type
        }
    }

    /// Read the full content into memory once.
    pub async fn read_all(&self) -> UploadResult<Bytes> {
        let data = match &self.source {
            FileSource::Memory(data) => data.clone(),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| UploadError::FileRead(format!("{}: {}", path.display(), e)))?,
        };

        if data.len() as u64 != self.size {
            return Err(UploadError::FileRead(format!(
                "{} changed since selection: expected {} bytes, read {}",
                self.name,
                self.size,
                data.len()
            )));
        }

        Ok(data)
    }
}
