//! Client library for the phoebe-server HTTP API.
//!
//! - Blocking HTTP/JSON transport (reqwest)
//! - Bearer-token authentication (register/login, or externally issued JWTs)
//! - Server-side session lifecycle (start/end, listing, memory/port status)
//! - Unified command execution: every domain operation is a flat
//!   `{..args, command}` envelope POSTed to `/send/{session_id}`
//!
//! Start with [`PhoebeClient`]:
//!
//! ```no_run
//! use phoebe_client::{ClientConfig, PhoebeClient};
//! use serde_json::Map;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = PhoebeClient::new(ClientConfig::default())?;
//! client.login("user@example.com", "password")?;
//! client.with_session(|client| {
//!     client.set_morphology("detached")?;
//!     client.run_compute(Map::new())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod sanitize;
pub mod session;
pub mod transport;

pub use auth::CredentialHolder;
pub use client::PhoebeClient;
pub use command::CommandClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, TransportError, TransportResult};
pub use session::SessionClient;
pub use transport::{HttpTransport, Transport};
