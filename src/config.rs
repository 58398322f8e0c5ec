//! Client configuration.
//!
//! [`ClientConfig`] collects everything needed to talk to a Controlla
//! instance: where it lives, which API version to address, how to verify
//! its certificate, and which credentials to present. The configuration is
//! consumed by [`ControllaClient::new`](crate::ControllaClient::new) and is
//! immutable afterwards.

use std::time::Duration;

use crate::auth::{Credentials, OAuth1Credentials};

/// Configuration for a [`ControllaClient`](crate::ControllaClient).
///
/// Only the host is required. Every other setting has a default matching a
/// plain unauthenticated instance: `http`, no explicit port, API version
/// `2`, webhook version `1.0`, TLS verification on, no timeout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// URI scheme, without the `://` separator.
    pub protocol: String,
    /// Hostname of the Controlla instance.
    pub host: String,
    /// Explicit port. When unset the URI carries no port component.
    pub port: Option<u16>,
    /// REST API version addressed by [`build_uri`](crate::uri::build_uri).
    pub api_version: String,
    /// Path prefix mounted in front of every REST path, for instances
    /// served under a subpath. Empty by default.
    pub base_path: String,
    /// Override for the `/rest/api/{version}` segment. Takes precedence
    /// over any per-request override.
    pub intermediate_path: Option<String>,
    /// Webhook API version addressed by
    /// [`build_webhook_uri`](crate::uri::build_webhook_uri).
    pub webhook_version: String,
    /// Whether to verify the server certificate chain.
    pub verify_tls: bool,
    /// Additional root certificate in PEM form, trusted alongside the
    /// system roots.
    pub ca_certificate: Option<String>,
    /// Per-request timeout. Unset means the transport default applies.
    pub timeout: Option<Duration>,
    /// Credential inputs, resolved to an auth mode at client construction.
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Create a configuration for the given host with all defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            protocol: "http".to_string(),
            host: host.into(),
            port: None,
            api_version: "2".to_string(),
            base_path: String::new(),
            intermediate_path: None,
            webhook_version: "1.0".to_string(),
            verify_tls: true,
            ca_certificate: None,
            timeout: None,
            credentials: Credentials::default(),
        }
    }

    /// Set the URI scheme, typically `https`.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set an explicit port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Address a different REST API version.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Mount the REST paths under a prefix.
    #[must_use]
    pub fn with_base_path(mut self, base: impl Into<String>) -> Self {
        self.base_path = base.into();
        self
    }

    /// Replace the `/rest/api/{version}` segment entirely.
    #[must_use]
    pub fn with_intermediate_path(mut self, path: impl Into<String>) -> Self {
        self.intermediate_path = Some(path.into());
        self
    }

    /// Address a different webhook API version.
    #[must_use]
    pub fn with_webhook_version(mut self, version: impl Into<String>) -> Self {
        self.webhook_version = version.into();
        self
    }

    /// Enable or disable server certificate verification.
    #[must_use]
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Trust an additional root certificate, PEM-encoded.
    #[must_use]
    pub fn with_ca_certificate(mut self, pem: impl Into<String>) -> Self {
        self.ca_certificate = Some(pem.into());
        self
    }

    /// Set a per-request timeout. A zero duration is ignored and leaves
    /// the transport default in place.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = Some(timeout);
        }
        self
    }

    /// Authenticate with a username and password (or API token).
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials.username = Some(username.into());
        self.credentials.password = Some(password.into());
        self
    }

    /// Authenticate with an OAuth bearer token.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.credentials.bearer = Some(token.into());
        self
    }

    /// Authenticate by signing requests with OAuth 1.0a credentials.
    #[must_use]
    pub fn with_oauth1(mut self, credentials: OAuth1Credentials) -> Self {
        self.credentials.oauth = Some(credentials);
        self
    }
}
