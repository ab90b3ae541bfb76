//! Error taxonomy shared by the client and the controllers.
//!
//! [`RemoteError`] is what a remote call can fail with; [`ErrorKind`]
//! classifies it for the retry policy. [`CoreError`] adds the failures that
//! never reach the network (local validation, malformed periods).

/// How a failure should be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any request was sent. Never retried.
    Validation,
    /// A retry may succeed (network blip, 5xx, throttling).
    Transient,
    /// Conflict, permission denial, not-found. Never retried.
    Terminal,
}

/// Failure of a call against the remote business API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, reset).
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Remote error ({status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the response body, if any.
        message: Option<String>,
        /// Machine-readable error code from the response body, if any.
        code: Option<String>,
    },
}

impl RemoteError {
    /// Build a status error without a body.
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            message: None,
            code: None,
        }
    }

    /// Build a status error carrying the server's message.
    pub fn with_message(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: Some(message.into()),
            code: None,
        }
    }

    /// Classify the failure for the retry policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transient,
            Self::Status { status, .. } => match status {
                408 | 429 => ErrorKind::Transient,
                s if *s >= 500 => ErrorKind::Transient,
                400 | 422 => ErrorKind::Validation,
                _ => ErrorKind::Terminal,
            },
        }
    }

    /// Whether the retry policy may re-issue the call.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Message suitable for showing inline next to the affected row or section.
    ///
    /// Prefers the server's own message and falls back to generic copy keyed
    /// by status code.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::Status {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            Self::Status { status, .. } => generic_status_message(*status).to_string(),
        }
    }
}

/// Generic copy for a status code when the server supplies no message.
pub fn generic_status_message(status: u16) -> &'static str {
    match status {
        400 | 422 => "The request contains invalid data.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        408 => "The server took too long to respond. Please try again.",
        409 => "A record with the same key already exists.",
        429 => "Too many requests. Please wait a moment and try again.",
        s if s >= 500 => "The server encountered an error. Please try again later.",
        _ => "An unexpected error occurred.",
    }
}

/// Errors raised by core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidPeriod(_) => ErrorKind::Validation,
            Self::Remote(e) => e.kind(),
        }
    }

    /// Inline message for the view.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::InvalidPeriod(msg) => msg.clone(),
            Self::Remote(e) => e.user_message(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert_eq!(
            RemoteError::Transport("connection reset".into()).kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(RemoteError::status(500).is_transient());
        assert!(RemoteError::status(503).is_transient());
        assert!(RemoteError::status(429).is_transient());
    }

    #[test]
    fn conflicts_and_denials_are_terminal() {
        assert_eq!(RemoteError::status(409).kind(), ErrorKind::Terminal);
        assert_eq!(RemoteError::status(403).kind(), ErrorKind::Terminal);
        assert_eq!(RemoteError::status(404).kind(), ErrorKind::Terminal);
    }

    #[test]
    fn bad_request_is_validation() {
        assert_eq!(RemoteError::status(422).kind(), ErrorKind::Validation);
    }

    #[test]
    fn server_message_wins_over_generic_copy() {
        let err = RemoteError::with_message(409, "Username already taken");
        assert_eq!(err.user_message(), "Username already taken");
    }

    #[test]
    fn blank_server_message_falls_back_to_generic() {
        let err = RemoteError::with_message(404, "   ");
        assert_eq!(err.user_message(), "The requested resource was not found.");
    }

    #[test]
    fn unknown_status_uses_catch_all() {
        assert_eq!(
            RemoteError::status(418).user_message(),
            "An unexpected error occurred."
        );
    }

    #[test]
    fn core_error_wraps_remote_message() {
        let err: CoreError = RemoteError::status(403).into();
        assert_eq!(
            err.user_message(),
            "You do not have permission to perform this action."
        );
        assert_eq!(err.kind(), ErrorKind::Terminal);
    }
}
