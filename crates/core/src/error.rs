use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {0} (expected CSV, XLS, XLSX or PDF)")]
    UnsupportedFileType(String),
}
