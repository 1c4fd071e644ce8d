use async_trait::async_trait;
use retention_core::{
    ChangeSet, ChatMessage, Employee, SimulationOutcome, Summary, UploadFile, UploadReceipt,
};

use crate::error::ApiError;

/// The backend operations the views depend on.
///
/// `ApiClient` is the HTTP implementation; tests substitute in-memory fakes.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /upload` with the file as the multipart `file` field.
    async fn upload(&self, file: UploadFile) -> Result<UploadReceipt, ApiError>;

    /// `GET /dashboard/summary`.
    async fn summary(&self) -> Result<Summary, ApiError>;

    /// `GET /employees`.
    async fn employees(&self) -> Result<Vec<Employee>, ApiError>;

    /// `GET /employees/{id}`.
    async fn employee(&self, id: &str) -> Result<Employee, ApiError>;

    /// `POST /chat`; returns the assistant's reply text.
    async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ApiError>;

    /// `POST /simulate`. An in-band `{error}` is a `Rejected` outcome, not an `Err`.
    async fn simulate(
        &self,
        employee_id: &str,
        changes: &ChangeSet,
    ) -> Result<SimulationOutcome, ApiError>;
}
