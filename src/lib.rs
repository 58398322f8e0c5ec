//! Client library for the Controlla issue-tracking REST API.
//!
//! The crate wraps a remote Controlla instance behind a typed client:
//! connection settings and credentials are captured once in a
//! [`ClientConfig`], the effective [`AuthMode`] is resolved at
//! construction, and every call flows through URI construction,
//! request-descriptor assembly, and a pluggable [`Transport`].
//!
//! # Example
//!
//! ```no_run
//! use controlla::{ClientConfig, ControllaClient};
//!
//! # async fn run() -> controlla::Result<()> {
//! let config = ClientConfig::new("controlla.somehost.com")
//!     .with_protocol("https")
//!     .with_basic_auth("someusername", "somepassword");
//! let client = ControllaClient::new(config)?;
//!
//! let issue = client.find_issue("CTRL-42").await?;
//! println!("{issue}");
//! # Ok(())
//! # }
//! ```
//!
//! Endpoints without a typed method are reachable through
//! [`ControllaClient::get`] and [`ControllaClient::request`], which
//! return raw JSON values.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;
pub mod types;
pub mod uri;

pub use auth::{AuthMode, Credentials, OAuth1Credentials, SignatureMethod};
pub use client::ControllaClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use request::{RequestDescriptor, RequestOptions};
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{CurrentUser, Issue, Project, SearchRequest, SearchResult, ServerInfo};
pub use uri::UriOptions;
