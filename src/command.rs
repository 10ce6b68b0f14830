//! Command Execution
//!
//! Every domain operation flows through the single [`CommandClient::execute`]
//! call, which POSTs a flat `{..args, command}` envelope to
//! `/send/{session_id}`. The server dispatches on the `command` field.

use std::time::Duration;

use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::CredentialHolder;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::sanitize;
use crate::transport::{HttpTransport, Transport};

/// Client for the unified command-execution endpoint.
///
/// Holds the currently bound session id; a token and a session id are
/// independent, and both are required for a command to succeed (the
/// client enforces the session id, the server enforces auth).
pub struct CommandClient {
    base_url: Url,
    credentials: CredentialHolder,
    session_id: Option<String>,
    transport: Box<dyn Transport>,
}

impl CommandClient {
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
            session_id: None,
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

    /// Bind or clear the session id used by [`execute`](Self::execute).
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    /// Currently bound session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Execute a command in the bound session and return the server's
    /// response verbatim.
    ///
    /// Fails fast with [`ClientError::NoSession`] when no session id is
    /// bound; no request is sent in that case. Args keys should not
    /// collide with the literal key `"command"` — on collision the
    /// command name silently wins.
    pub fn execute(&self, command: &str, args: Map<String, Value>) -> ClientResult<Value> {
        let session_id = self.session_id.as_deref().ok_or(ClientError::NoSession)?;

        let mut payload = sanitize::sanitize_map(args);
        payload.insert("command".to_string(), Value::String(command.to_string()));

        let url = self.base_url.join(&format!("/send/{session_id}"))?;
        self.transport
            .send(
                Method::POST,
                url.as_str(),
                self.credentials.headers(),
                Some(&Value::Object(payload)),
            )
            .map_err(|source| {
                let auth = matches!(source.status(), Some(401 | 403));
                ClientError::Command {
                    command: command.to_string(),
                    auth,
                    source,
                }
            })
    }
}

impl std::fmt::Debug for CommandClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandClient")
            .field("base_url", &self.base_url.as_str())
            .field("session_id", &self.session_id)
            .field("has_token", &self.credentials.token().is_some())
            .finish()
    }
}
