//! API client for the activity sign-up server
//!
//! The server exposes a handful of form-style endpoints that take every argument
//! in the query string. This module knows their paths and verbs; `http` talks to
//! a live server through reqwest.

use async_trait::async_trait;
use serde::Deserialize;
use signup_core::{ActivitySnapshot, ClientConfig, ErrorContext, Session, SignupError, SignupResult};
use std::collections::HashMap;

pub mod http;


pub use http::HttpSignupApi;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the server
    pub base_url: String,
    /// Request timeout in seconds, `None` keeps transport defaults
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: None,
            user_agent: format!("signup-client/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set additional header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Join an endpoint path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl From<&ClientConfig> for ApiClientConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
            headers: HashMap::new(),
        }
    }
}

/// Operations the page performs against the server
#[async_trait]
pub trait SignupApi: Send + Sync {
    /// `GET /activities`
    async fn fetch_activities(&self) -> SignupResult<ActivitySnapshot>;

    /// `POST /login`. A non-2xx answer is `SignupError::Rejected`.
    async fn login(&self, username: &str, password: &str) -> SignupResult<Session>;

    /// `POST /logout`. Only transport failures are reported; the response is ignored.
    async fn logout(&self, token: &str) -> SignupResult<()>;

    /// `POST /activities/{name}/signup`, returning the server's message
    async fn signup(&self, activity: &str, email: &str, token: &str) -> SignupResult<String>;

    /// `DELETE /activities/{name}/unregister`, returning the server's message
    async fn unregister(&self, activity: &str, email: &str, token: &str) -> SignupResult<String>;
}

/// Endpoint paths with every dynamic segment percent-encoded
pub mod endpoints {
    use urlencoding::encode;

    pub fn activities() -> String {
        "/activities".to_string()
    }

    pub fn login(username: &str, password: &str) -> String {
        format!(
            "/login?username={}&password={}",
            encode(username),
            encode(password)
        )
    }

    pub fn logout(token: &str) -> String {
        format!("/logout?token={}", encode(token))
    }

    pub fn signup(activity: &str, email: &str, token: &str) -> String {
        format!(
            "/activities/{}/signup?email={}&token={}",
            encode(activity),
            encode(email),
            encode(token)
        )
    }

    pub fn unregister(activity: &str, email: &str, token: &str) -> String {
        format!(
            "/activities/{}/unregister?email={}&token={}",
            encode(activity),
            encode(email),
            encode(token)
        )
    }
}

/// Body of a successful login
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Body of a signup/unregister answer, success or failure
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ActionResponse {
    /// Server detail as display text. Structured details are shown as JSON.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> SignupResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            SignupError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            SignupError::Config {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

        let header_value =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| SignupError::Config {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            })?;

        headers.insert(header_name, header_value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout_seconds) = config.timeout_seconds {
        builder = builder.timeout(std::time::Duration::from_secs(timeout_seconds));
    }

    builder.build().map_err(|e| SignupError::Config {
        message: format!("Failed to create HTTP client: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("http_client").with_operation("create_client"),
    })
}
