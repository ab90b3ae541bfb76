//! Shared request plumbing for the entity and report clients.
//!
//! [`ApiClient`] owns one pooled [`reqwest::Client`], the API base URL and the
//! credential provider. It converts every failure into a
//! [`RemoteError`]: transport problems become `Transport`, non-2xx answers
//! become `Status` carrying whatever `message`/`error`/`code` the body had.

use std::sync::Arc;
use std::time::Duration;

use backoffice_core::error::RemoteError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::credentials::{Anonymous, BearerToken, CredentialProvider};
use crate::error::ClientError;

/// HTTP client for the business API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

/// Error body shapes the backend is known to send.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration. A configured token becomes a
    /// [`BearerToken`] provider.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let credentials: Arc<dyn CredentialProvider> = match &config.api_token {
            Some(token) => Arc::new(BearerToken::new(token.clone())),
            None => Arc::new(Anonymous),
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(client, &config.base_url, credentials)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling across
    /// several API handles).
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET` with query parameters, decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, RemoteError> {
        let request = self.request(Method::GET, path).query(query);
        Self::parse_response(Self::send(request).await?).await
    }

    /// Send a JSON body and decode a JSON response.
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let request = self.request(method, path).json(body);
        Self::parse_response(Self::send(request).await?).await
    }

    /// Send a bodiless request and discard the response body.
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<(), RemoteError> {
        let request = self.request(method, path);
        Self::ensure_success(Self::send(request).await?).await?;
        Ok(())
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.credentials.authorization() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Request failed before a response arrived");
            RemoteError::Transport(e.to_string())
        })
    }

    /// Return the response unchanged on 2xx, or a [`RemoteError::Status`]
    /// built from the status and error body.
    async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message: body.message.or(body.error),
            code: body.code,
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let response = Self::ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Transport(format!("Malformed response body: {e}")))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn client(base: &str) -> Result<ApiClient, ClientError> {
        ApiClient::with_client(reqwest::Client::new(), base, Arc::new(Anonymous))
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = client("http://localhost:8080/api/").unwrap();
        assert_eq!(c.base_url(), "http://localhost:8080/api");
        assert_eq!(c.url("users"), "http://localhost:8080/api/users");
        assert_eq!(c.url("/users/3"), "http://localhost:8080/api/users/3");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert_matches!(client("localhost:8080"), Err(ClientError::InvalidBaseUrl(_)));
    }
}
