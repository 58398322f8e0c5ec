//! Request descriptor assembly.
//!
//! Every call builds one [`RequestDescriptor`] in three layers: the base
//! descriptor (GET, JSON decoding on, TLS verification from the
//! configuration), then caller-supplied [`RequestOptions`] which win on
//! every field they set, then client defaults (resolved auth mode and
//! configured timeout) which fill only the fields still unset.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::auth::AuthMode;

/// A fully assembled request, ready for the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Fully qualified request URI.
    pub uri: String,
    /// Whether the response body is decoded as JSON.
    pub json: bool,
    /// Whether the server certificate chain is verified.
    pub verify_tls: bool,
    /// JSON request body, if any.
    pub body: Option<Value>,
    /// Authentication attached to the request. `None` means no
    /// authentication material at all.
    pub auth: Option<AuthMode>,
    /// Timeout for this request.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// The base descriptor for a URI: GET, JSON decoding enabled, no
    /// body, no authentication, no timeout.
    pub fn new(uri: impl Into<String>, verify_tls: bool) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            json: true,
            verify_tls,
            body: None,
            auth: None,
            timeout: None,
        }
    }

    /// Layer caller-supplied options on top. Every field the options set
    /// replaces the corresponding descriptor field.
    #[must_use]
    pub fn apply(mut self, options: &RequestOptions) -> Self {
        if let Some(method) = &options.method {
            self.method = method.clone();
        }
        if let Some(uri) = &options.uri {
            self.uri = uri.clone();
        }
        if let Some(json) = options.json {
            self.json = json;
        }
        if let Some(verify_tls) = options.verify_tls {
            self.verify_tls = verify_tls;
        }
        if let Some(body) = &options.body {
            self.body = Some(body.clone());
        }
        if let Some(auth) = &options.auth {
            self.auth = Some(auth.clone());
        }
        if let Some(timeout) = options.timeout {
            self.timeout = Some(timeout);
        }
        self
    }

    /// Fill authentication and timeout from client defaults, touching
    /// only fields no earlier layer has set. A resolved
    /// [`AuthMode::None`] attaches nothing.
    #[must_use]
    pub fn with_defaults(mut self, auth: &AuthMode, timeout: Option<Duration>) -> Self {
        if self.auth.is_none() && *auth != AuthMode::None {
            self.auth = Some(auth.clone());
        }
        if self.timeout.is_none() {
            self.timeout = timeout;
        }
        self
    }
}

/// Caller-supplied overrides for a single request.
///
/// Unset fields leave the descriptor untouched; set fields always win
/// over both the base descriptor and the client defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    /// Override the HTTP method.
    pub method: Option<Method>,
    /// Override the request URI.
    pub uri: Option<String>,
    /// Override JSON response decoding.
    pub json: Option<bool>,
    /// Override TLS verification.
    pub verify_tls: Option<bool>,
    /// Attach a JSON body.
    pub body: Option<Value>,
    /// Override the authentication mode.
    pub auth: Option<AuthMode>,
    /// Override the timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options that override nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Replace the request URI.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Enable or disable JSON response decoding.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    /// Enable or disable TLS verification for this request.
    #[must_use]
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replace the authentication mode for this request.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set a timeout for this request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
