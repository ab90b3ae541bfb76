//! Credential attachment for outgoing calls.
//!
//! Session storage is owned elsewhere; the client only asks for the value of
//! the `Authorization` header at request time.

/// Supplies the `Authorization` header value for outgoing requests.
pub trait CredentialProvider: Send + Sync {
    fn authorization(&self) -> Option<String>;
}

/// No credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn authorization(&self) -> Option<String> {
        None
    }
}

/// A fixed bearer token.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl CredentialProvider for BearerToken {
    fn authorization(&self) -> Option<String> {
        Some(format!("Bearer {}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_formats_header() {
        assert_eq!(
            BearerToken::new("abc").authorization().as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn debug_output_hides_token() {
        assert!(!format!("{:?}", BearerToken::new("secret")).contains("secret"));
    }
}
