//! Error types for the Controlla client.
//!
//! Two failure paths exist: transport failures surface unchanged as
//! [`Error::Transport`], and structurally successful responses that
//! encode an application-level failure become [`Error::RemoteApi`].

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by [`ControllaClient`](crate::ControllaClient) calls.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote service reported application-level failures in an
    /// otherwise successful response. Carries the joined message text.
    #[error("remote API error: {0}")]
    RemoteApi(String),

    /// The transport failed before a usable response was produced.
    /// Surfaced unchanged, not retried.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body did not have the shape the caller asked for.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, Error>;
