//! Bearer Credential Storage
//!
//! Holds the optional bearer token and produces the header set attached
//! to every request. Purely in-memory; no network or persistence.

use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Stores an optional opaque bearer token.
///
/// The session and command clients each own one of these; the facade is
/// the single writer that keeps both copies in sync. The token shape is
/// not validated.
#[derive(Debug, Clone, Default)]
pub struct CredentialHolder {
    token: Option<String>,
}

impl CredentialHolder {
    /// New holder with no token set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Currently stored token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Header set for a request: `Content-Type: application/json` always,
    /// plus `Authorization: Bearer <token>` when a token is present.
    ///
    /// A token containing bytes that cannot appear in an HTTP header
    /// value is skipped with a warning: the `Authorization` header is
    /// omitted entirely and the request proceeds unauthenticated (the
    /// server will answer 401/403).
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                // Tokens are opaque strings; one that cannot form a valid
                // header value is sent as no header at all.
                Err(_) => warn!("bearer token contains invalid header characters; omitting Authorization"),
            }
        }
        headers
    }
}
