use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RetentionError;

/// Extension → MIME type for the formats the ingestion endpoint accepts.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("csv", "text/csv"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("xls", "application/vnd.ms-excel"),
    ("pdf", "application/pdf"),
];

/// Resolve the MIME type for a file name, or `None` if it is not accepted.
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// A single employee-data file ready to be posted as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build from in-memory contents. Rejects anything that is not CSV,
    /// XLS, XLSX or PDF.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, RetentionError> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name)
            .ok_or_else(|| RetentionError::UnsupportedFileType(file_name.clone()))?;
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Read a file from disk. The type check runs before the read.
    pub fn from_path(path: &Path) -> Result<Self, RetentionError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RetentionError::UnsupportedFileType(path.display().to_string()))?
            .to_string();
        if mime_for(&file_name).is_none() {
            return Err(RetentionError::UnsupportedFileType(file_name));
        }
        let bytes = std::fs::read(path)?;
        debug!(file = %file_name, size = bytes.len(), "Loaded upload file");
        Self::new(file_name, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Reduce a drop to the single file that will be transmitted.
/// Only the first accepted file of a multi-file drop is kept.
pub fn accept_drop(files: Vec<UploadFile>) -> Option<UploadFile> {
    let dropped = files.len();
    let first = files.into_iter().next();
    if dropped > 1 {
        debug!(dropped, "Multi-file drop, keeping the first file only");
    }
    first
}

/// Acknowledgement from `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}
