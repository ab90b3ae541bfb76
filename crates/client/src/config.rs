/// Connection settings for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the business API, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    /// Bearer token attached to every request, if any.
    pub api_token: Option<String>,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
        }
    }
}
