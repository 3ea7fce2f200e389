//! HTTP client wrapper for the Todoist REST API.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{ApiError, Error, Result};
use crate::models::{CreatedTask, NewTask};

/// Base URL for the Todoist REST API v2.
pub const BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for [`TodoistClient`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use todoist_api_rs::client::TodoistClientBuilder;
///
/// let client = TodoistClientBuilder::new("my-token")
///     .base_url("https://todoist.example.com/rest/v2")
///     .request_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url(), "https://todoist.example.com/rest/v2");
/// ```
#[derive(Debug, Clone)]
pub struct TodoistClientBuilder {
    token: String,
    base_url: String,
    request_timeout: Duration,
}

impl TodoistClientBuilder {
    /// Creates a builder with the default base URL and timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides the API base URL. A trailing slash is dropped.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout enforced by the HTTP client.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<TodoistClient> {
        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;

        Ok(TodoistClient {
            token: self.token,
            http_client,
            base_url: self.base_url,
            request_timeout: self.request_timeout,
        })
    }
}

/// Client for interacting with the Todoist API.
#[derive(Clone)]
pub struct TodoistClient {
    token: String,
    http_client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl TodoistClient {
    /// Creates a new TodoistClient with the given API token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        TodoistClientBuilder::new(token).build()
    }

    /// Creates a new TodoistClient with a custom base URL.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        TodoistClientBuilder::new(token).base_url(base_url).build()
    }

    /// Returns a builder for configuring the client.
    pub fn builder(token: impl Into<String>) -> TodoistClientBuilder {
        TodoistClientBuilder::new(token)
    }

    /// Returns the API token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Creates a task via `POST /tasks`.
    ///
    /// The created record is returned as Todoist sent it; callers that need
    /// the `id` check for it themselves.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] for any non-2xx status, carrying the raw body.
    /// - [`Error::Json`] when a 2xx body is not a JSON object.
    /// - [`Error::Http`] for transport failures.
    pub async fn create_task(&self, task: &NewTask) -> Result<CreatedTask> {
        self.post("/tasks", task).await
    }

    /// Performs a POST request to the given endpoint with a JSON body.
    ///
    /// The success body is read as text first so a non-JSON answer surfaces
    /// as [`Error::Json`] rather than a transport error.
    async fn post<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api(ApiError::Http {
                status: status.as_u16(),
                body: text,
            }));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl fmt::Debug for TodoistClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoistClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
