use std::str::FromStr;
use std::time::Duration;

use backoffice_client::ClientConfig;
use backoffice_controller::ToggleRetryConfig;
use backoffice_core::query::{clamp_page_size, DEFAULT_PAGE_SIZE};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub client: ClientConfig,
    /// Initial page size for list commands.
    pub default_page_size: u32,
    pub toggle_retry: ToggleRetryConfig,
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                     |
    /// |-----------------------------|-----------------------------|
    /// | `BACKOFFICE_API_URL`        | `http://localhost:8080/api` |
    /// | `BACKOFFICE_API_TOKEN`      | unset                       |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                        |
    /// | `DEFAULT_PAGE_SIZE`         | `10`                        |
    /// | `TOGGLE_MAX_RETRIES`        | `3`                         |
    /// | `TOGGLE_RETRY_ENABLED`      | `true`                      |
    /// | `TOGGLE_RETRY_DELAY_MS`     | `500`                       |
    /// | `TOGGLE_RETRY_MAX_DELAY_MS` | `4000`                      |
    /// | `TOGGLE_LOG_ATTEMPTS`       | `false`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client_defaults = ClientConfig::default();
        let retry_defaults = ToggleRetryConfig::default();

        let base_url = lookup("BACKOFFICE_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(client_defaults.base_url);

        let api_token = lookup("BACKOFFICE_API_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let request_timeout_secs = parse_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            "u64",
            client_defaults.request_timeout_secs,
        )?;

        let default_page_size =
            clamp_page_size(parse_var(&lookup, "DEFAULT_PAGE_SIZE", "u32", DEFAULT_PAGE_SIZE)?);

        let max_retries = parse_var(
            &lookup,
            "TOGGLE_MAX_RETRIES",
            "u32",
            retry_defaults.max_retries,
        )?;
        let retry_enabled = parse_var(
            &lookup,
            "TOGGLE_RETRY_ENABLED",
            "bool",
            retry_defaults.retry_enabled,
        )?;
        let delay_ms: u64 = parse_var(
            &lookup,
            "TOGGLE_RETRY_DELAY_MS",
            "u64",
            retry_defaults.initial_delay.as_millis() as u64,
        )?;
        let max_delay_ms: u64 = parse_var(
            &lookup,
            "TOGGLE_RETRY_MAX_DELAY_MS",
            "u64",
            retry_defaults.max_delay.as_millis() as u64,
        )?;
        let log_attempts = parse_var(
            &lookup,
            "TOGGLE_LOG_ATTEMPTS",
            "bool",
            retry_defaults.log_attempts,
        )?;

        Ok(Self {
            client: ClientConfig {
                base_url,
                api_token,
                request_timeout_secs,
            },
            default_page_size,
            toggle_retry: ToggleRetryConfig {
                // At least the first attempt always runs.
                max_retries: max_retries.max(1),
                retry_enabled,
                initial_delay: Duration::from_millis(delay_ms),
                max_delay: Duration::from_millis(max_delay_ms.max(delay_ms)),
                log_attempts,
                ..retry_defaults
            },
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();

        assert_eq!(config.client.base_url, "http://localhost:8080/api");
        assert_eq!(config.client.api_token, None);
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.toggle_retry.max_retries, 3);
        assert!(config.toggle_retry.retry_enabled);
        assert_eq!(config.toggle_retry.initial_delay, Duration::from_millis(500));
        assert_eq!(config.toggle_retry.max_delay, Duration::from_secs(4));
        assert!(!config.toggle_retry.log_attempts);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("BACKOFFICE_API_URL", "https://admin.example.com/api"),
            ("BACKOFFICE_API_TOKEN", "secret"),
            ("DEFAULT_PAGE_SIZE", "25"),
            ("TOGGLE_MAX_RETRIES", "5"),
            ("TOGGLE_RETRY_ENABLED", "false"),
            ("TOGGLE_LOG_ATTEMPTS", "true"),
        ])
        .unwrap();

        assert_eq!(config.client.base_url, "https://admin.example.com/api");
        assert_eq!(config.client.api_token.as_deref(), Some("secret"));
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.toggle_retry.max_retries, 5);
        assert!(!config.toggle_retry.retry_enabled);
        assert!(config.toggle_retry.log_attempts);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("BACKOFFICE_API_TOKEN", "  "), ("REQUEST_TIMEOUT_SECS", "")]).unwrap();
        assert_eq!(config.client.api_token, None);
        assert_eq!(config.client.request_timeout_secs, 30);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(load(&[("DEFAULT_PAGE_SIZE", "500")]).unwrap().default_page_size, 100);
    }

    #[test]
    fn zero_retries_still_allows_one_attempt() {
        let config = load(&[("TOGGLE_MAX_RETRIES", "0")]).unwrap();
        assert_eq!(config.toggle_retry.max_retries, 1);
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = load(&[("TOGGLE_MAX_RETRIES", "lots")]).unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid { name: "TOGGLE_MAX_RETRIES", expected: "u32", .. }
        );
        assert_eq!(
            err.to_string(),
            "TOGGLE_MAX_RETRIES must be a valid u32, got 'lots'"
        );
    }
}
