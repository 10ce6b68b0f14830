//! Client Configuration
//!
//! Connection parameters for a phoebe-server instance. Fixed at
//! construction; there is no dynamic reconfiguration.

use serde::{Deserialize, Serialize};
use url::Url;

/// Default server hostname.
pub const DEFAULT_HOST: &str = "localhost";
/// Default server port.
pub const DEFAULT_PORT: u16 = 8001;
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection parameters shared by every sub-client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server hostname.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request deadline in seconds, applied uniformly to every call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Start a session immediately on construction.
    #[serde(default)]
    pub auto_session: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            auto_session: false,
        }
    }
}

impl ClientConfig {
    /// Config for a server at `host:port`, with default timeout and no
    /// auto-session.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Base URL derived from host and port.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}", self.host, self.port))
    }
}
