//! Request URI construction.
//!
//! URIs are assembled from the configured protocol, host, port, and path
//! pieces as `{protocol}://{host}[:{port}]{base}{prefix}{pathname}[?query]`.
//! The prefix is the configuration's intermediate path if set, else the
//! per-request override, else the versioned default (`/rest/api/{version}`
//! for API endpoints, `/rest/webhooks/{version}` for webhooks).
//!
//! By default the assembled URI is returned percent-decoded. Callers that
//! need strict encoding opt in with [`UriOptions::encoded`]. The two
//! transformations are not inverses of each other; the asymmetry is part
//! of the contract and pinned by tests.

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC,
};

use crate::config::ClientConfig;

/// Escape set for query keys and values. Component-level encoding:
/// alphanumerics and `-_.!~*'()` pass through, everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escape set for whole-URI encoding. Reserved URI delimiters pass
/// through; characters that cannot appear raw in a URI, including `%`
/// itself, are escaped.
const FULL_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Per-request inputs to URI construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UriOptions {
    pathname: String,
    query: Vec<(String, String)>,
    intermediate_path: Option<String>,
    encode: bool,
}

impl UriOptions {
    /// Start from a path relative to the versioned API segment, e.g.
    /// `/issue/CTRL-42`.
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }

    /// Append one query parameter. Repeated keys repeat in the query
    /// string, in insertion order.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replace the versioned segment for this request only. A
    /// configuration-level intermediate path still wins when both are set.
    #[must_use]
    pub fn with_intermediate_path(mut self, path: impl Into<String>) -> Self {
        self.intermediate_path = Some(path.into());
        self
    }

    /// Return the URI percent-encoded instead of percent-decoded.
    #[must_use]
    pub fn encoded(mut self) -> Self {
        self.encode = true;
        self
    }
}

/// Build a fully qualified URI for a REST API endpoint.
///
/// The path prefix falls back to `/rest/api/{api_version}` when neither
/// the configuration nor the options carry an intermediate path.
pub fn build_uri(config: &ClientConfig, options: &UriOptions) -> String {
    let segment = format!("/rest/api/{}", config.api_version);
    format_uri(config, options, &segment)
}

/// Build a fully qualified URI for a webhook endpoint.
///
/// Identical assembly to [`build_uri`] except the default segment is
/// `/rest/webhooks/{webhook_version}`, which is versioned independently
/// of the REST API.
pub fn build_webhook_uri(config: &ClientConfig, options: &UriOptions) -> String {
    let segment = format!("/rest/webhooks/{}", config.webhook_version);
    format_uri(config, options, &segment)
}

fn format_uri(config: &ClientConfig, options: &UriOptions, default_segment: &str) -> String {
    let prefix = config
        .intermediate_path
        .as_deref()
        .or(options.intermediate_path.as_deref())
        .unwrap_or(default_segment);

    let mut path = format!("{}{}{}", config.base_path, prefix, options.pathname);
    if !path.starts_with('/') {
        path.insert(0, '/');
    }

    let authority = match config.port {
        Some(port) => format!("{}:{}", config.host, port),
        None => config.host.clone(),
    };

    let mut uri = format!("{}://{}{}", config.protocol, authority, path);

    if !options.query.is_empty() {
        let query = options
            .query
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        uri.push('?');
        uri.push_str(&query);
    }

    if options.encode {
        utf8_percent_encode(&uri, FULL_URI).to_string()
    } else {
        // Percent sequences that do not decode to valid UTF-8 leave the
        // URI unchanged.
        match percent_decode_str(&uri).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("h")
    }

    #[test]
    fn test_default_uri_with_port_and_query() {
        let config = config().with_port(8080);
        let options = UriOptions::new("/issue").with_query("x", "1");

        assert_eq!(
            build_uri(&config, &options),
            "http://h:8080/rest/api/2/issue?x=1"
        );
    }

    #[test]
    fn test_missing_port_omits_segment() {
        let options = UriOptions::new("/issue");
        assert_eq!(build_uri(&config(), &options), "http://h/rest/api/2/issue");
    }

    #[test]
    fn test_base_path_prefixes_versioned_segment() {
        let config = config().with_base_path("/controlla");
        let options = UriOptions::new("/issue");

        assert_eq!(
            build_uri(&config, &options),
            "http://h/controlla/rest/api/2/issue"
        );
    }

    #[test]
    fn test_leading_slash_is_added() {
        let config = config().with_base_path("controlla");
        let options = UriOptions::new("/issue");

        assert_eq!(
            build_uri(&config, &options),
            "http://h/controlla/rest/api/2/issue"
        );
    }

    #[test]
    fn test_intermediate_path_from_options() {
        let options = UriOptions::new("/issue").with_intermediate_path("/custom");
        assert_eq!(build_uri(&config(), &options), "http://h/custom/issue");
    }

    #[test]
    fn test_config_intermediate_path_wins() {
        let config = config().with_intermediate_path("/from-config");
        let options = UriOptions::new("/issue").with_intermediate_path("/from-call");

        assert_eq!(build_uri(&config, &options), "http://h/from-config/issue");
    }

    #[test]
    fn test_webhook_default_segment() {
        let options = UriOptions::new("/webhook");
        assert_eq!(
            build_webhook_uri(&config(), &options),
            "http://h/rest/webhooks/1.0/webhook"
        );
    }

    #[test]
    fn test_webhook_honors_intermediate_path() {
        let config = config().with_intermediate_path("/custom");
        let options = UriOptions::new("/webhook");

        assert_eq!(build_webhook_uri(&config, &options), "http://h/custom/webhook");
    }

    #[test]
    fn test_repeated_query_keys() {
        let options = UriOptions::new("/search")
            .with_query("fields", "summary")
            .with_query("fields", "status");

        assert_eq!(
            build_uri(&config(), &options),
            "http://h/rest/api/2/search?fields=summary&fields=status"
        );
    }

    #[test]
    fn test_default_output_is_decoded() {
        // Query serialization escapes the space, the default decode pass
        // then unescapes the whole URI again.
        let options = UriOptions::new("/search").with_query("jql", "a b");
        assert_eq!(
            build_uri(&config(), &options),
            "http://h/rest/api/2/search?jql=a b"
        );

        let options = UriOptions::new("/a%20b");
        assert_eq!(build_uri(&config(), &options), "http://h/rest/api/2/a b");
    }

    #[test]
    fn test_encoded_output() {
        let options = UriOptions::new("/a b").encoded();
        assert_eq!(build_uri(&config(), &options), "http://h/rest/api/2/a%20b");

        // Encoding happens after query serialization, so the escaped
        // space is escaped a second time.
        let options = UriOptions::new("/search").with_query("jql", "a b").encoded();
        assert_eq!(
            build_uri(&config(), &options),
            "http://h/rest/api/2/search?jql=a%2520b"
        );
    }

    #[test]
    fn test_undecodable_percent_sequence_skips_decoding() {
        // A sequence that does not decode to valid UTF-8 leaves the whole
        // URI as assembled, decodable sequences included.
        let options = UriOptions::new("/attachment/a%20b%FF");
        assert_eq!(
            build_uri(&config(), &options),
            "http://h/rest/api/2/attachment/a%20b%FF"
        );
    }

    #[test]
    fn test_build_uri_is_pure() {
        let config = config().with_port(8080).with_api_version("3");
        let options = UriOptions::new("/issue/CTRL-42").with_query("expand", "changelog");

        assert_eq!(build_uri(&config, &options), build_uri(&config, &options));
    }
}
