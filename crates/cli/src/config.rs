use anyhow::{Context, Result};
use retention_core::config::{profiled_env_opt, Config};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration loaded from TOML file. Every field is optional; unset
/// fields fall through to the environment and then to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend API base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (0 disables)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// ROI assumption: cost to replace one employee
    #[serde(default)]
    pub replacement_cost: Option<f64>,

    /// ROI assumption: onboarding and training cost per hire
    #[serde(default)]
    pub training_cost: Option<f64>,

    /// Prior chat messages sent as context with each turn
    #[serde(default)]
    pub history_window: Option<usize>,
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/retention-cli/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("retention-cli");
        Ok(config_dir)
    }

    /// Return the default config file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// Returns default config if the file does not exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };
        Self::load_from(&config_path)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            debug!(?config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }
        debug!(?config_path, "Loading config");
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
        Ok(config)
    }

    /// Merge into effective settings.
    /// Priority: cli flag > env var > config file > built-in default.
    pub fn resolve(&self, env: Config, api_url_flag: Option<&str>) -> Config {
        let profile = env.profile.clone();
        let env_set = |key: &str| profiled_env_opt(&profile, key).is_some();
        let mut settings = env;

        if !env_set("API_BASE_URL") {
            if let Some(url) = &self.api_url {
                settings.api.base_url = url.clone();
            }
        }
        if !env_set("API_TIMEOUT_SECS") {
            if let Some(secs) = self.timeout_secs {
                settings.api.timeout_secs = secs;
            }
        }
        if !env_set("ROI_REPLACEMENT_COST") {
            if let Some(cost) = self.replacement_cost {
                settings.roi.replacement_cost = cost;
            }
        }
        if !env_set("ROI_TRAINING_COST") {
            if let Some(cost) = self.training_cost {
                settings.roi.training_cost = cost;
            }
        }
        if !env_set("CHAT_HISTORY_WINDOW") {
            if let Some(window) = self.history_window {
                settings.chat.history_window = window;
            }
        }

        if let Some(url) = api_url_flag {
            settings.api.base_url = url.to_string();
        }
        settings
    }

    /// Return the saved chat transcripts directory path.
    pub fn transcripts_dir() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("transcripts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retention_core::config::DEFAULT_API_BASE_URL;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.history_window.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"http://hr:9000/api/v1\"\nreplacement_cost = 45000.0\n").unwrap();
        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://hr:9000/api/v1"));
        assert_eq!(config.replacement_cost, Some(45_000.0));
        assert!(config.training_cost.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [").unwrap();
        assert!(CliConfig::load(path.to_str()).is_err());
    }

    #[test]
    fn test_file_fills_unset_env_and_flag_wins() {
        // Profile with no variables set, so only file and flag apply.
        let env = Config {
            profile: "RTNCLITEST".into(),
            ..Config::default()
        };
        let file = CliConfig {
            api_url: Some("http://from-file/api/v1".into()),
            training_cost: Some(7_500.0),
            ..CliConfig::default()
        };

        let settings = file.resolve(env.clone(), None);
        if std::env::var("API_BASE_URL").is_err() {
            assert_eq!(settings.api.base_url, "http://from-file/api/v1");
        }
        if std::env::var("ROI_TRAINING_COST").is_err() {
            assert_eq!(settings.roi.training_cost, 7_500.0);
        }

        let settings = file.resolve(env, Some("http://flag/api/v1"));
        assert_eq!(settings.api.base_url, "http://flag/api/v1");
    }

    #[test]
    fn test_env_beats_file() {
        std::env::set_var("RTNENVTEST_CHAT_HISTORY_WINDOW", "9");
        let env = Config::for_profile("rtnenvtest");
        let file = CliConfig {
            history_window: Some(2),
            ..CliConfig::default()
        };
        let settings = file.resolve(env, None);
        assert_eq!(settings.chat.history_window, 9);
        std::env::remove_var("RTNENVTEST_CHAT_HISTORY_WINDOW");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CliConfig {
            api_url: Some(DEFAULT_API_BASE_URL.into()),
            ..CliConfig::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
    }
}
