//! Data import: one file in, refresh signal out.

use retention_client::{ApiError, Backend};
use retention_core::{accept_drop, UploadFile, UploadReceipt};
use tracing::{error, info};

pub const UPLOAD_FAILED: &str = "Failed to upload file. Please check the format.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
}

#[derive(Debug, Default)]
pub struct UploadView {
    state: UploadState,
    last_error: Option<String>,
    last_receipt: Option<UploadReceipt>,
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_receipt(&self) -> Option<&UploadReceipt> {
        self.last_receipt.as_ref()
    }

    /// Pick the file to send from a drop. `None` when busy or nothing was dropped.
    pub fn begin(&mut self, files: Vec<UploadFile>) -> Option<UploadFile> {
        if self.state == UploadState::Uploading {
            return None;
        }
        let file = accept_drop(files)?;
        self.state = UploadState::Uploading;
        self.last_error = None;
        Some(file)
    }

    /// Settle the upload. The view is idle and retryable afterwards either way.
    pub fn finish(
        &mut self,
        result: Result<UploadReceipt, ApiError>,
        on_success: impl FnOnce(&UploadReceipt),
    ) -> bool {
        self.state = UploadState::Idle;
        match result {
            Ok(receipt) => {
                info!(count = ?receipt.count, "Upload accepted");
                on_success(&receipt);
                self.last_receipt = Some(receipt);
                true
            }
            Err(e) => {
                error!(error = %e, "Upload failed");
                self.last_error = Some(e.detail().unwrap_or(UPLOAD_FAILED).to_string());
                false
            }
        }
    }

    /// Send the first file of `files`. Returns whether the backend accepted it.
    pub async fn drop_files(
        &mut self,
        backend: &dyn Backend,
        files: Vec<UploadFile>,
        on_success: impl FnOnce(&UploadReceipt),
    ) -> bool {
        let Some(file) = self.begin(files) else {
            return false;
        };
        let result = backend.upload(file).await;
        self.finish(result, on_success)
    }
}
