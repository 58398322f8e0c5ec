//! HTTP transport layer.
//!
//! [`Transport`] is the seam between request assembly and the network:
//! one method, one request in, one decoded JSON body (or error) out. The
//! production implementation drives reqwest; tests substitute their own
//! implementation to capture descriptors or replay canned responses.

use async_trait::async_trait;
use reqwest::{header, Certificate, Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthMode;
use crate::request::RequestDescriptor;

mod sign;

/// Errors raised at the transport boundary.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request URI could not be parsed.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The network request failed (connection, TLS, timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, verbatim.
        message: String,
    },

    /// A success response carried a body that is not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// OAuth request signing failed.
    #[error("request signing failed: {0}")]
    Signing(String),
}

/// The capability that performs the actual network request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the decoded response body.
    ///
    /// `Ok(None)` means the server replied successfully with an empty
    /// body. Non-success statuses and network failures are
    /// [`TransportError`]s.
    async fn send(&self, request: &RequestDescriptor) -> Result<Option<Value>, TransportError>;
}

/// Production transport backed by reqwest.
///
/// Holds two connection pools, one verifying server certificates and one
/// accepting any certificate, and picks per request based on the
/// descriptor's TLS flag.
#[derive(Debug)]
pub struct HttpTransport {
    verified: Client,
    unverified: Client,
}

impl HttpTransport {
    /// Build a transport trusting the system root certificates.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_ca_certificate(None)
    }

    /// Build a transport that additionally trusts the given PEM root
    /// certificate, for instances signed by a private CA.
    pub fn with_ca_certificate(ca_pem: Option<&str>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(pem) = ca_pem {
            let certificate = Certificate::from_pem(pem.as_bytes())?;
            builder = builder.add_root_certificate(certificate);
        }
        let verified = builder.build()?;

        let unverified = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            verified,
            unverified,
        })
    }

    fn client_for(&self, request: &RequestDescriptor) -> &Client {
        if request.verify_tls {
            &self.verified
        } else {
            &self.unverified
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<Option<Value>, TransportError> {
        let url = Url::parse(&request.uri)
            .map_err(|_| TransportError::InvalidUrl(request.uri.clone()))?;

        let mut builder = self
            .client_for(request)
            .request(request.method.clone(), url.clone());

        if request.json {
            builder = builder
                .header(header::ACCEPT, "application/json")
                .header(header::CONTENT_TYPE, "application/json");
        }

        match &request.auth {
            Some(AuthMode::OAuth1(credentials)) => {
                let value = sign::authorization_header(credentials, &request.method, url.as_str())?;
                builder = builder.header(header::AUTHORIZATION, value);
            }
            Some(mode) => {
                if let Some(value) = mode.header_value() {
                    builder = builder.header(header::AUTHORIZATION, value);
                }
            }
            None => {}
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, uri = %request.uri, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        if !request.json {
            if body.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Value::String(body)));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|err| TransportError::Decode(err.to_string()))
    }
}
