//! Client Error Types
//!
//! One taxonomy for everything the client can fail with, so callers can
//! branch on authentication vs. session vs. command vs. usage errors
//! without parsing raw status codes. The HTTP status is still carried in
//! the message for debugging.

use thiserror::Error;

/// Failure surfaced by the HTTP transport layer.
///
/// The transport never retries; every outcome other than a 2xx response
/// with a well-formed JSON body maps onto exactly one of these variants.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network-level failure (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response whose body was not valid JSON.
    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Numeric HTTP status, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// Client-level errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Credentials rejected: register/login failed, or a 401/403 came
    /// back from an auth-sensitive endpoint.
    #[error("authentication failed: {source}")]
    Authentication {
        status: Option<u16>,
        #[source]
        source: TransportError,
    },

    /// A session or auth endpoint failed for a non-credential reason
    /// (network error, non-2xx status, malformed response).
    #[error("session request failed: {source}")]
    Session {
        #[source]
        source: TransportError,
    },

    /// A domain command failed while executing via `/send/{session_id}`.
    /// `auth` is set when the server answered 401/403.
    #[error("command {command:?} failed: {source}")]
    Command {
        command: String,
        auth: bool,
        #[source]
        source: TransportError,
    },

    /// `execute` was called with no session id bound. Caller error; no
    /// network request was attempted.
    #[error("no session id bound; call start_session() first")]
    NoSession,

    /// The HTTP client could not be built. Raised at construction time,
    /// before any endpoint was contacted.
    #[error("client setup failed: {source}")]
    Setup {
        #[source]
        source: TransportError,
    },

    /// Host/port did not form a valid base URL.
    #[error("invalid server address: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Numeric HTTP status, when the underlying failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Session { source }
            | Self::Command { source, .. }
            | Self::Setup { source } => source.status(),
            Self::NoSession | Self::InvalidUrl(_) => None,
        }
    }

    /// True for credential problems, including commands rejected with
    /// 401/403.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Command { auth: true, .. }
        )
    }

    /// Re-wrap a session failure as an authentication failure. Used by
    /// register/login so callers can tell credential problems apart from
    /// general connectivity problems.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Self::Session { source } => Self::Authentication {
                status: source.status(),
                source,
            },
            other => other,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_403() -> TransportError {
        TransportError::Status {
            status: 403,
            body: "forbidden".to_string(),
        }
    }

    #[test]
    fn test_status_preserved_in_message() {
        let err = ClientError::Authentication {
            status: Some(403),
            source: status_403(),
        };
        assert!(err.to_string().contains("403"));
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_session_error_rewraps_as_auth() {
        let err = ClientError::Session {
            source: status_403(),
        };
        assert!(!err.is_auth());

        let err = err.into_auth();
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_command_auth_flag() {
        let err = ClientError::Command {
            command: "get_value".to_string(),
            auth: true,
            source: status_403(),
        };
        assert!(err.is_auth());

        let err = ClientError::Command {
            command: "get_value".to_string(),
            auth: false,
            source: TransportError::Status {
                status: 500,
                body: String::new(),
            },
        };
        assert!(!err.is_auth());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_no_session_has_no_status() {
        assert_eq!(ClientError::NoSession.status(), None);
        assert!(!ClientError::NoSession.is_auth());
    }

    #[test]
    fn test_setup_error_is_not_a_session_failure() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::Setup {
            source: TransportError::Decode(parse_err),
        };
        assert!(!matches!(err, ClientError::Session { .. }));
        assert!(!err.is_auth());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("setup"));
    }
}
