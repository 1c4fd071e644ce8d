//! HTTP client for the attrition backend.
//!
//! One method per endpoint. Non-2xx answers become `ApiError::Api` with any
//! `detail` the backend supplied, so views can show it verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use retention_core::config::ApiConfig;
use retention_core::{
    ChangeSet, ChatMessage, Employee, SimulationOutcome, Summary, UploadFile, UploadReceipt,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::backend::Backend;
use crate::error::ApiError;

/// Client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

/// Response of the service root health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChatResponseBody {
    Reply { response: String },
    Failed { error: String },
}

#[derive(Serialize)]
struct SimulateRequestBody<'a> {
    employee_id: &'a str,
    changes: &'a ChangeSet,
}

impl ApiClient {
    /// Create a client with no request timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = parse_base(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL. Segments are percent-encoded,
    /// so an employee id containing `/` or spaces stays one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Check the service root (`GET /` on the backend host).
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self
            .base_url
            .join("/")
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
        debug!(%url, "Health check");
        let resp = self
            .http
            .get(url)
            .timeout(Duration::from_secs(3))
            .send()
            .await?;
        decode(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        decode(resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(%url, "POST");
        let resp = self.http.post(url).json(body).send().await?;
        decode(resp).await
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn upload(&self, file: UploadFile) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint(&["upload"]);
        debug!(%url, file = %file.file_name, size = file.len(), "Uploading");
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.mime)?;
        let form = Form::new().part("file", part);
        let resp = self.http.post(url).multipart(form).send().await?;
        decode(resp).await
    }

    async fn summary(&self) -> Result<Summary, ApiError> {
        self.get_json(&["dashboard", "summary"]).await
    }

    async fn employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_json(&["employees"]).await
    }

    async fn employee(&self, id: &str) -> Result<Employee, ApiError> {
        self.get_json(&["employees", id]).await
    }

    async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ApiError> {
        let body = ChatRequestBody { message, history };
        match self.post_json(&["chat"], &body).await? {
            ChatResponseBody::Reply { response } => Ok(response),
            ChatResponseBody::Failed { error } => Err(ApiError::Api {
                status: 200,
                body: error.clone(),
                detail: Some(error),
            }),
        }
    }

    async fn simulate(
        &self,
        employee_id: &str,
        changes: &ChangeSet,
    ) -> Result<SimulationOutcome, ApiError> {
        let body = SimulateRequestBody {
            employee_id,
            changes,
        };
        self.post_json(&["simulate"], &body).await
    }
}

fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(base_url.to_string()));
    }
    Ok(url)
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status.as_u16(), body));
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}
