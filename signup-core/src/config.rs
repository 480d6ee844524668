//! Client configuration

use crate::error::{ErrorContext, SignupError, SignupResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for talking to the activities server and persisting the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the activities server
    pub base_url: String,
    /// Request timeout in seconds. Transport defaults apply when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
    /// File backing the session key-value store (`~` expands to the home dir)
    pub store_path: String,
    /// How long "Login successful!" stays up before the page refreshes
    pub login_confirm_ms: u64,
    /// How long signup/unregister feedback stays visible
    pub feedback_hide_ms: u64,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: None,
            user_agent: format!("signup-client/{}", env!("CARGO_PKG_VERSION")),
            store_path: "~/.signup/session.json".to_string(),
            login_confirm_ms: 1000,
            feedback_hide_ms: 5000,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SignupResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SignupError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| SignupError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SignupResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SignupError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| SignupError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Apply `SIGNUP_BASE_URL` and `SIGNUP_STORE_PATH` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("SIGNUP_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(store_path) = std::env::var("SIGNUP_STORE_PATH") {
            self.store_path = store_path;
        }
    }

    /// Store path with a leading `~` expanded
    pub fn resolved_store_path(&self) -> PathBuf {
        expand_home(&self.store_path)
    }

    /// Validate configuration
    pub fn validate(&self) -> SignupResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(crate::config_error!("base_url must not be empty", "config"));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| SignupError::Config {
            message: format!("Invalid base_url '{}': {}", self.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use a full URL such as http://127.0.0.1:8000"),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SignupError::Config {
                message: format!("Unsupported base_url scheme: {}", parsed.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use http or https"),
            });
        }

        if self.login_confirm_ms == 0 || self.feedback_hide_ms == 0 {
            return Err(SignupError::Config {
                message: "Message delays must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set login_confirm_ms and feedback_hide_ms to positive values"),
            });
        }

        if self.store_path.trim().is_empty() {
            return Err(crate::config_error!("store_path must not be empty", "config"));
        }

        Ok(())
    }

    /// Default config file locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|d| d.join("signup").join("config.toml")),
            dirs::home_dir().map(|d| d.join(".signup").join("config.toml")),
            Some(PathBuf::from("signup.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}
