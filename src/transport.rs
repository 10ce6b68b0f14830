//! HTTP Transport
//!
//! One-shot blocking request/response against the server. The trait seam
//! exists so the session and command clients can run against a recording
//! transport in tests; [`HttpTransport`] is the production implementation
//! over `reqwest::blocking`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

use crate::error::{TransportError, TransportResult};

/// A single blocking HTTP exchange.
///
/// Implementations never retry and never log. Any network failure,
/// non-2xx status, or malformed JSON body on a 2xx response is surfaced
/// as a [`TransportError`].
pub trait Transport: Send + Sync {
    /// Send one request and return the parsed JSON response body.
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> TransportResult<Value>;
}

/// Production transport over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose every request carries the given deadline.
    pub fn new(timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish()
    }
}


#[cfg(test)]
pub(crate) mod testing {
    //! Recording transport double shared by the unit tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use reqwest::header::HeaderMap;
    use reqwest::Method;
    use serde_json::{json, Value};

    use super::Transport;
    use crate::error::TransportResult;

    /// One request as seen by the spy.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub headers: HeaderMap,
        pub body: Option<Value>,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }
    }

    /// Transport double that records traffic and replays canned
    /// responses in order. When the queue is empty it answers `{}`.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        requests: Mutex<Vec<RecordedRequest>>,
        responses: Mutex<VecDeque<TransportResult<Value>>>,
    }

    impl RecordingTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push_response(&self, response: TransportResult<Value>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for Arc<RecordingTransport> {
        fn send(
            &self,
            method: Method,
            url: &str,
            headers: HeaderMap,
            body: Option<&Value>,
        ) -> TransportResult<Value> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                headers,
                body: body.cloned(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({})))
        }
    }
}
