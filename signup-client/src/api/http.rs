//! reqwest-backed implementation of [`SignupApi`]

use async_trait::async_trait;
use signup_core::{ActivitySnapshot, ErrorContext, Session, SignupError, SignupResult};
use tracing::{debug, info};

use super::{
    create_http_client, endpoints, ActionResponse, ApiClientConfig, LoginResponse, SignupApi,
};

/// HTTP client for the sign-up server
pub struct HttpSignupApi {
    client: reqwest::Client,
    config: ApiClientConfig,
}

impl HttpSignupApi {
    /// Create a new client
    pub fn new(config: ApiClientConfig) -> SignupResult<Self> {
        let client = create_http_client(&config)?;

        info!("Created sign-up API client for {}", config.base_url);

        Ok(Self { client, config })
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        operation: &str,
    ) -> SignupResult<reqwest::Response> {
        let url = self.config.url(path);

        debug!(method = %method, operation = operation, "Sending request");

        self.client
            .request(method, &url)
            .send()
            .await
            .map_err(|e| SignupError::Network {
                message: format!("Request to {} failed: {}", operation, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_api")
                    .with_operation(operation)
                    .with_suggestion("Check that the activities server is running"),
            })
    }

    /// Read a signup/unregister answer. Both success and failure bodies are JSON.
    async fn action_result(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> SignupResult<String> {
        let status = response.status();
        let body: ActionResponse = parse_json(response, operation).await?;

        if status.is_success() {
            Ok(body.message.unwrap_or_default())
        } else {
            Err(SignupError::Rejected {
                status: status.as_u16(),
                detail: body.detail_text(),
                context: ErrorContext::new("http_api").with_operation(operation),
            })
        }
    }
}

#[async_trait]
impl SignupApi for HttpSignupApi {
    async fn fetch_activities(&self) -> SignupResult<ActivitySnapshot> {
        let response = self
            .send(reqwest::Method::GET, &endpoints::activities(), "fetch_activities")
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignupError::Rejected {
                status: status.as_u16(),
                detail: None,
                context: ErrorContext::new("http_api").with_operation("fetch_activities"),
            });
        }

        let body = response.text().await.map_err(|e| SignupError::Network {
            message: format!("Failed to read activities body: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_api").with_operation("fetch_activities"),
        })?;

        let snapshot = ActivitySnapshot::from_json(&body).map_err(|e| SignupError::Parse {
            message: format!("Failed to parse activities: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_api").with_operation("fetch_activities"),
        })?;

        debug!(count = snapshot.len(), "Fetched activities");
        Ok(snapshot)
    }

    async fn login(&self, username: &str, password: &str) -> SignupResult<Session> {
        let response = self
            .send(
                reqwest::Method::POST,
                &endpoints::login(username, password),
                "login",
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignupError::Rejected {
                status: status.as_u16(),
                detail: None,
                context: ErrorContext::new("http_api")
                    .with_operation("login")
                    .with_metadata("username", username),
            });
        }

        let body: LoginResponse = parse_json(response, "login").await?;
        Ok(Session::new(body.token, body.username))
    }

    async fn logout(&self, token: &str) -> SignupResult<()> {
        let response = self
            .send(reqwest::Method::POST, &endpoints::logout(token), "logout")
            .await?;

        debug!(status = response.status().as_u16(), "Logout acknowledged");
        Ok(())
    }

    async fn signup(&self, activity: &str, email: &str, token: &str) -> SignupResult<String> {
        let response = self
            .send(
                reqwest::Method::POST,
                &endpoints::signup(activity, email, token),
                "signup",
            )
            .await?;

        self.action_result(response, "signup").await
    }

    async fn unregister(&self, activity: &str, email: &str, token: &str) -> SignupResult<String> {
        let response = self
            .send(
                reqwest::Method::DELETE,
                &endpoints::unregister(activity, email, token),
                "unregister",
            )
            .await?;

        self.action_result(response, "unregister").await
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation: &str,
) -> SignupResult<T> {
    response.json::<T>().await.map_err(|e| SignupError::Parse {
        message: format!("Failed to parse {} response: {}", operation, e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("http_api").with_operation(operation),
    })
}
