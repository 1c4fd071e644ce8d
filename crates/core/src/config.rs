use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
pub fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub api: ApiConfig,
    pub roi: RoiConfig,
    pub chat: ChatConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RETENTION_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RETENTION_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            api: ApiConfig::from_env_profiled(p),
            roi: RoiConfig::from_env_profiled(p),
            chat: ChatConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  api:   base_url={}, timeout={}s", self.api.base_url, self.api.timeout_secs);
        tracing::info!(
            "  roi:   replacement_cost={}, training_cost={}",
            self.roi.replacement_cost,
            self.roi.training_cost
        );
        tracing::info!("  chat:  history_window={}", self.chat.history_window);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            api: ApiConfig::default(),
            roi: RoiConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

// ── Backend API ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl ApiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "API_BASE_URL", DEFAULT_API_BASE_URL),
            timeout_secs: profiled_env_parse(p, "API_TIMEOUT_SECS", 30),
        }
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

// ── ROI assumptions ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiConfig {
    pub replacement_cost: f64,
    pub training_cost: f64,
}

impl RoiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            replacement_cost: profiled_env_parse(p, "ROI_REPLACEMENT_COST", 30_000.0),
            training_cost: profiled_env_parse(p, "ROI_TRAINING_COST", 5_000.0),
        }
    }
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            replacement_cost: 30_000.0,
            training_cost: 5_000.0,
        }
    }
}

// ── Chat ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many prior messages travel with each chat request.
    pub history_window: usize,
}

impl ChatConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            history_window: profiled_env_parse(p, "CHAT_HISTORY_WINDOW", 5),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { history_window: 5 }
    }
}
