//! Authentication handling for the Controlla API.
//!
//! Credential inputs are collected on the configuration and resolved once,
//! at client construction, into a single [`AuthMode`] by fixed precedence:
//! OAuth1 over bearer token over basic credentials over no authentication.
//! The resolved mode never changes for the lifetime of a client.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Raw credential inputs supplied at configuration time.
///
/// Multiple credential sets may be present simultaneously;
/// [`AuthMode::resolve`] picks the effective one. Absent credentials are
/// valid and resolve to [`AuthMode::None`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Username for basic authentication.
    pub username: Option<String>,
    /// Password (or API token) for basic authentication.
    pub password: Option<String>,
    /// OAuth bearer token.
    pub bearer: Option<String>,
    /// OAuth 1.0a credential set.
    pub oauth: Option<OAuth1Credentials>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("bearer", &self.bearer.as_ref().map(|_| "***"))
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// The resolved, mutually exclusive authentication strategy attached to
/// outgoing requests.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No authentication material is attached.
    None,
    /// HTTP basic authentication.
    Basic {
        /// The username.
        username: String,
        /// The password or API token.
        password: String,
    },
    /// OAuth bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
    /// OAuth 1.0a request signing.
    OAuth1(OAuth1Credentials),
}

impl AuthMode {
    /// Resolve the effective mode from raw credential inputs.
    ///
    /// Precedence when multiple sets are supplied: OAuth1, then bearer,
    /// then basic (which requires both username and password). Anything
    /// else resolves to [`AuthMode::None`] without error.
    pub fn resolve(credentials: &Credentials) -> Self {
        if let Some(oauth) = &credentials.oauth {
            return AuthMode::OAuth1(oauth.clone());
        }
        if let Some(token) = &credentials.bearer {
            return AuthMode::Bearer {
                token: token.clone(),
            };
        }
        if let (Some(username), Some(password)) = (&credentials.username, &credentials.password) {
            return AuthMode::Basic {
                username: username.clone(),
                password: password.clone(),
            };
        }
        AuthMode::None
    }

    /// Render the `Authorization` header value for header-only modes.
    ///
    /// Basic credentials are Base64-encoded as `username:password`. OAuth1
    /// needs the request method and URI and is rendered by the transport's
    /// signer instead; `None` attaches nothing.
    pub fn header_value(&self) -> Option<String> {
        match self {
            AuthMode::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                Some(format!("Basic {encoded}"))
            }
            AuthMode::Bearer { token } => Some(format!("Bearer {token}")),
            AuthMode::None | AuthMode::OAuth1(_) => None,
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::None => write!(f, "None"),
            AuthMode::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            AuthMode::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            AuthMode::OAuth1(credentials) => f.debug_tuple("OAuth1").field(credentials).finish(),
        }
    }
}

/// OAuth 1.0a credential set.
///
/// With the RSA-SHA1 signature method the consumer secret is the
/// PEM-encoded RSA private key used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Credentials {
    /// The consumer key registered with the Controlla instance.
    pub consumer_key: String,
    /// The consumer secret (RSA private key PEM for RSA-SHA1).
    pub consumer_secret: String,
    /// The access token obtained during the OAuth dance.
    pub access_token: String,
    /// The access token secret.
    pub access_token_secret: String,
    /// The signature method used by the signer.
    pub signature_method: SignatureMethod,
}

impl OAuth1Credentials {
    /// Create a credential set with the default RSA-SHA1 signature method.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
            signature_method: SignatureMethod::default(),
        }
    }

    /// Select a different signature method.
    pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
        self.signature_method = method;
        self
    }
}

impl fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .field("signature_method", &self.signature_method)
            .finish()
    }
}

/// OAuth 1.0a signature methods understood by the signer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureMethod {
    /// PKCS#1 v1.5 RSA signature over SHA-1 (the default).
    #[default]
    RsaSha1,
    /// HMAC over SHA-1.
    HmacSha1,
    /// The unsigned PLAINTEXT method.
    Plaintext,
}

impl SignatureMethod {
    /// The wire name sent as `oauth_signature_method`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::RsaSha1 => "RSA-SHA1",
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::Plaintext => "PLAINTEXT",
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
