/// Errors raised while building an [`ApiClient`](crate::ApiClient).
///
/// Request failures are reported as
/// [`RemoteError`](backoffice_core::error::RemoteError) instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The underlying reqwest client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Build(#[from] reqwest::Error),
}
