/// Failure talking to the attrition backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API base URL '{0}'")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api {
        status: u16,
        body: String,
        /// `detail` (or `error`) string from a JSON error body.
        detail: Option<String>,
    },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Build from a non-2xx response body.
    pub fn from_body(status: u16, body: String) -> Self {
        let detail = extract_detail(&body);
        ApiError::Api {
            status,
            body,
            detail,
        }
    }

    /// Backend-supplied explanation, when the body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Best-effort text for the user: backend detail, then this error's own
    /// message, then `fallback`.
    pub fn describe_or(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        let own = self.to_string();
        if own.trim().is_empty() {
            fallback.to_string()
        } else {
            own
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a human-readable message from `{"detail": "..."}` or `{"error": "..."}`.
/// Structured validation details (arrays) are ignored.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
