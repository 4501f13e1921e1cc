//! File candidates: the one document a submission uploads.
//!
//! A [`FileCandidate`] is what a file picker or a drop hands over: a name, a
//! declared size and a media type, plus a way to get the bytes later. The
//! bytes of an on-disk file are not read until the request is built, so an
//! oversized file is rejected from its metadata alone.
//!
//! The media type of a path is guessed from its extension, which is what a
//! browser reports for a picked file. Content is not sniffed for validation;
//! a `.pdf` without the `%PDF` header only produces a warning.

use crate::error::{DocQaError, ValidationError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The only media type the service accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Upload size limit: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Where a candidate's bytes come from.
#[derive(Debug, Clone)]
enum FileSource {
    /// Read lazily from disk at send time.
    Path(PathBuf),
    /// Already in memory.
    Memory(Vec<u8>),
}

/// A user-chosen file, before or after validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    name: String,
    size: u64,
    media_type: String,
    source: FileSource,
}

impl FileCandidate {
    /// Describe a file on disk from its metadata.
    ///
    /// The media type is guessed from the extension (`application/octet-stream`
    /// when unknown). Only the first four bytes are read, to warn about PDFs
    /// whose content does not match their name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocQaError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = std::fs::metadata(path).map_err(|e| DocQaError::FileRead {
            name: name.clone(),
            source: e,
        })?;
        if !metadata.is_file() {
            return Err(DocQaError::FileRead {
                name,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ),
            });
        }

        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        if media_type == PDF_MEDIA_TYPE && !has_pdf_magic(path) {
            warn!("'{}' is named like a PDF but lacks the %PDF header", name);
        }

        debug!(
            "Candidate file '{}': {} bytes, {}",
            name,
            metadata.len(),
            media_type
        );

        Ok(Self {
            name,
            size: metadata.len(),
            media_type,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Describe an in-memory file. The size is the buffer length.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// File-info label shown once the file is selected: `"<name> (<size>)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size))
    }

    /// Check the selection rules: PDF media type first, then size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.media_type != PDF_MEDIA_TYPE {
            return Err(ValidationError::UnsupportedFileType {
                media_type: self.media_type.clone(),
            });
        }
        if self.size > MAX_FILE_SIZE {
            return Err(ValidationError::FileTooLarge {
                size: self.size,
                max: MAX_FILE_SIZE,
            });
        }
        Ok(())
    }

    /// Load the file contents for upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, DocQaError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| DocQaError::FileRead {
                        name: self.name.clone(),
                        source: e,
                    })
            }
        }
    }
}

fn has_pdf_magic(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    match std::fs::File::open(path) {
        Ok(mut f) => f.read_exact(&mut magic).is_ok() && &magic == b"%PDF",
        Err(_) => false,
    }
}

/// Human-readable size in base-1024 units.
///
/// Divides by 1024 until the value is below 1024 (stopping at GB), then
/// rounds to two decimals without trailing zeros: `1536` → `"1.5 KB"`,
/// `1048576` → `"1 MB"`, `0` → `"0 Bytes"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}
