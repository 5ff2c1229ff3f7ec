//! Environment API implementation using reqwest.
//!
//! This adapter implements the `EnvironmentApi` port against the
//! `/api/v1/env` REST resource.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use secretly_application::ports::{ApiError, EnvironmentApi};
use secretly_domain::{Environment, EnvironmentId, EnvironmentPayload, VariableId};

use crate::config::ClientConfig;
use crate::http::{ListEnvelope, ResponseEnvelope};
use crate::serialization::from_json_bytes;

const JSON: &str = "application/json";

/// HTTP client for the environment resource.
///
/// Wraps `reqwest::Client`. Every request carries
/// `Content-Type: application/json`. A non-2xx response, or a 2xx response
/// whose envelope reports a failure, is an `ApiError::Status`.
pub struct ReqwestEnvironmentApi {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestEnvironmentApi {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates an API client around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms(),
        }
    }

    /// Builds `<base>/env/<segments...>`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("unusable base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("env")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await.map_err(|e| self.map_error(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        let envelope = from_json_bytes::<ResponseEnvelope>(&body).ok();

        if !status.is_success() {
            let message = envelope.and_then(|envelope| envelope.error_text());
            tracing::debug!(status = status.as_u16(), ?message, "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // A 2xx response can still carry a failure in its envelope.
        if let Some(envelope) = envelope
            && let Some(code) = envelope.failure_status()
        {
            let message = envelope.error_text();
            tracing::debug!(status = status.as_u16(), code, ?message, "request failed in envelope");
            return Err(ApiError::Status {
                status: code,
                message,
            });
        }

        Ok(body.to_vec())
    }

    async fn fetch(&self, url: Url) -> Result<Vec<Environment>, ApiError> {
        let body = self.send(self.request(Method::GET, url)).await?;
        let envelope: ListEnvelope =
            from_json_bytes(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.data.into_iter().map(Environment::from).collect())
    }

    /// Maps reqwest errors to port errors.
    fn map_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            return ApiError::Timeout {
                timeout_ms: self.timeout_ms,
            };
        }
        if error.is_decode() || error.is_body() {
            return ApiError::Decode(error.to_string());
        }
        ApiError::Transport(error.to_string())
    }
}

#[async_trait]
impl EnvironmentApi for ReqwestEnvironmentApi {
    async fn list(&self) -> Result<Vec<Environment>, ApiError> {
        self.fetch(self.endpoint(&[])?).await
    }

    async fn list_named(&self, name: &str) -> Result<Vec<Environment>, ApiError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut().append_pair("name", name);
        self.fetch(url).await
    }

    async fn create(
        &self,
        payload: &EnvironmentPayload,
    ) -> Result<Option<EnvironmentId>, ApiError> {
        let url = self.endpoint(&[])?;
        let body = self
            .send(self.request(Method::POST, url).json(payload))
            .await?;
        // The create already happened; a body without an id is not a failure.
        Ok(from_json_bytes::<ResponseEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.data_id()))
    }

    async fn update(
        &self,
        id: EnvironmentId,
        payload: &EnvironmentPayload,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&[&id.to_string()])?;
        self.send(self.request(Method::PUT, url).json(payload))
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: EnvironmentId) -> Result<(), ApiError> {
        let url = self.endpoint(&[&id.to_string()])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    async fn delete_variable(
        &self,
        environment: EnvironmentId,
        variable: VariableId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&[&environment.to_string(), "value", &variable.to_string()])?;
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }
}
