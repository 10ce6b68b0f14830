//! Session and Authentication Endpoints
//!
//! Client for the server's session lifecycle (start/end, listing,
//! memory and port status) and authentication (config discovery,
//! register/login, current user). On a successful register or login the
//! returned access token is captured into the credential holder.

use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::auth::CredentialHolder;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{HttpTransport, Transport};

/// Client for session management and authentication.
///
/// Session-id-agnostic: the session id is a call parameter (for
/// `end_session`), never stored here. The bound session id lives in the
/// command client.
pub struct SessionClient {
    base_url: Url,
    credentials: CredentialHolder,
    transport: Box<dyn Transport>,
}

impl SessionClient {
    /// Client over the production HTTP transport.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))
            .map_err(|source| ClientError::Setup { source })?;
        Self::with_transport(config, Box::new(transport))
    }

    /// Client over a caller-supplied transport. Tests inject a recording
    /// transport here.
    pub fn with_transport(config: &ClientConfig, transport: Box<dyn Transport>) -> ClientResult<Self> {
        Ok(Self {
            base_url: config.base_url()?,
            credentials: CredentialHolder::new(),
            transport,
        })
    }

    /// Set or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.credentials.set_token(token);
    }

    /// Currently stored token, if any.
    pub fn token(&self) -> Option<&str> {
        self.credentials.token()
    }

    /// One request against a session/auth endpoint. 401/403 surfaces as
    /// an authentication failure, everything else as a session failure.
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        let url = self.base_url.join(path)?;
        self.transport
            .send(method, url.as_str(), self.credentials.headers(), body)
            .map_err(|source| match source.status() {
                Some(status @ (401 | 403)) => ClientError::Authentication {
                    status: Some(status),
                    source,
                },
                _ => ClientError::Session { source },
            })
    }

    fn capture_token(&mut self, result: &Value) {
        if let Some(token) = result.get("access_token").and_then(Value::as_str) {
            self.credentials.set_token(Some(token.to_string()));
        }
    }

    // ---- auth ---------------------------------------------------------

    /// Discover the server's auth mode. No side effect.
    pub fn get_auth_config(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/auth/config", None)
    }

    /// Register a new user. Captures the returned access token on
    /// success. Failures surface as authentication errors.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<Value> {
        let body = json!({
            "email": email,
            "password": password,
            "first_name": first_name,
            "last_name": last_name,
        });
        let result = self
            .request(Method::POST, "/auth/register", Some(&body))
            .map_err(ClientError::into_auth)?;
        self.capture_token(&result);
        Ok(result)
    }

    /// Log in. Captures the returned access token on success. Failures
    /// surface as authentication errors.
    pub fn login(&mut self, email: &str, password: &str) -> ClientResult<Value> {
        let body = json!({ "email": email, "password": password });
        let result = self
            .request(Method::POST, "/auth/login", Some(&body))
            .map_err(ClientError::into_auth)?;
        self.capture_token(&result);
        Ok(result)
    }

    /// Current authenticated user's info. Requires a valid token.
    pub fn get_me(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/auth/me", None)
    }

    // ---- sessions -----------------------------------------------------

    /// List sessions known to the server.
    pub fn get_sessions(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/dash/sessions", None)
    }

    /// Start a server-side session. The response carries the new
    /// `session_id`; binding it into the command client is the caller's
    /// job (the facade does this).
    pub fn start_session(&self, metadata: Option<&Value>) -> ClientResult<Value> {
        self.request(Method::POST, "/dash/start-session", metadata)
    }

    /// End the session with the given id. Does not touch any bound
    /// session id elsewhere.
    pub fn end_session(&self, session_id: &str) -> ClientResult<Value> {
        self.request(Method::POST, &format!("/dash/end-session/{session_id}"), None)
    }

    /// Per-session memory metrics.
    pub fn get_memory_usage(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/dash/session-memory", None)
    }

    /// Server port allocation status.
    pub fn get_port_status(&self) -> ClientResult<Value> {
        self.request(Method::GET, "/dash/port-status", None)
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &self.credentials.token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::testing::RecordingTransport;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn client(spy: &Arc<RecordingTransport>) -> SessionClient {
        SessionClient::with_transport(&ClientConfig::default(), Box::new(Arc::clone(spy))).unwrap()
    }

    #[test]
    fn test_login_captures_token() {
        let spy = RecordingTransport::new();
        spy.push_response(Ok(json!({
            "access_token": "tok-1",
            "token_type": "bearer",
        })));
        let mut sessions = client(&spy);

        sessions.login("a@b.com", "pw").unwrap();
        assert_eq!(sessions.token(), Some("tok-1"));

        let requests = spy.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "http://localhost:8001/auth/login");
        assert_eq!(
            requests[0].body,
            Some(json!({"email": "a@b.com", "password": "pw"}))
        );
    }

    #[test]
    fn test_login_rejection_is_auth_error_with_status() {
        let spy = RecordingTransport::new();
        spy.push_response(Err(TransportError::Status {
            status: 403,
            body: "bad credentials".to_string(),
        }));
        let mut sessions = client(&spy);

        let err = sessions.login("a@b.com", "x").unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("403"));
        assert_eq!(sessions.token(), None);
    }

    #[test]
    fn test_register_sends_names_and_captures_token() {
        let spy = RecordingTransport::new();
        spy.push_response(Ok(json!({"access_token": "tok-2", "token_type": "bearer"})));
        let mut sessions = client(&spy);

        sessions.register("a@b.com", "pw", "Ada", "Lovelace").unwrap();
        assert_eq!(sessions.token(), Some("tok-2"));

        let requests = spy.requests();
        assert_eq!(
            requests[0].body,
            Some(json!({
                "email": "a@b.com",
                "password": "pw",
                "first_name": "Ada",
                "last_name": "Lovelace",
            }))
        );
    }

    #[test]
    fn test_login_without_token_in_response_leaves_none() {
        let spy = RecordingTransport::new();
        spy.push_response(Ok(json!({"token_type": "bearer"})));
        let mut sessions = client(&spy);
        sessions.login("a@b.com", "pw").unwrap();
        assert_eq!(sessions.token(), None);
    }

    #[test]
    fn test_network_failure_on_session_endpoint_is_session_error() {
        let spy = RecordingTransport::new();
        spy.push_response(Err(TransportError::Status {
            status: 500,
            body: "boom".to_string(),
        }));
        let sessions = client(&spy);

        let err = sessions.get_sessions().unwrap_err();
        assert!(matches!(err, ClientError::Session { .. }));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_get_me_unauthorized_is_auth_error() {
        let spy = RecordingTransport::new();
        spy.push_response(Err(TransportError::Status {
            status: 401,
            body: "no token".to_string(),
        }));
        let sessions = client(&spy);

        let err = sessions.get_me().unwrap_err();
        assert!(matches!(err, ClientError::Authentication { .. }));
    }

    #[test]
    fn test_end_session_targets_path_parameter() {
        let spy = RecordingTransport::new();
        let sessions = client(&spy);
        sessions.end_session("abc").unwrap();
        assert_eq!(
            spy.requests()[0].url,
            "http://localhost:8001/dash/end-session/abc"
        );
    }

    #[test]
    fn test_start_session_forwards_metadata() {
        let spy = RecordingTransport::new();
        let sessions = client(&spy);
        let metadata = json!({"origin": "test"});
        sessions.start_session(Some(&metadata)).unwrap();

        let requests = spy.requests();
        assert_eq!(requests[0].url, "http://localhost:8001/dash/start-session");
        assert_eq!(requests[0].body, Some(metadata));
    }
}
