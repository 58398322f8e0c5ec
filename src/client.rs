//! Controlla API client.
//!
//! [`ControllaClient`] captures an immutable [`ClientConfig`] at
//! construction, resolves the authentication mode once, and then serves
//! requests: URI construction, descriptor assembly, transport execution,
//! and remote-error inspection.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::auth::AuthMode;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::{RequestDescriptor, RequestOptions};
use crate::transport::{HttpTransport, Transport};
use crate::types::{CurrentUser, Issue, Project, SearchRequest, SearchResult, ServerInfo};
use crate::uri::{self, UriOptions};

/// Response field under which the remote service reports
/// application-level failures.
const ERROR_MESSAGES_KEY: &str = "errorMessages";

/// The Controlla API client.
///
/// Cheap to share: concurrent calls against the same client are safe
/// because no call mutates client state.
pub struct ControllaClient {
    config: ClientConfig,
    auth: AuthMode,
    transport: Arc<dyn Transport>,
}

impl ControllaClient {
    /// Create a client over the production HTTP transport.
    ///
    /// Resolves the authentication mode from the configured credentials
    /// and builds the underlying HTTP connection pools.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, for example
    /// when the configured CA certificate is not valid PEM.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_ca_certificate(config.ca_certificate.as_deref())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// This is the seam for tests and for embedding a custom HTTP stack.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let auth = AuthMode::resolve(&config.credentials);
        info!(host = %config.host, "Created Controlla client");

        Self {
            config,
            auth,
            transport,
        }
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The resolved authentication mode.
    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth
    }

    /// Build a fully qualified URI for a REST API endpoint.
    pub fn build_uri(&self, options: &UriOptions) -> String {
        uri::build_uri(&self.config, options)
    }

    /// Build a fully qualified URI for a webhook endpoint.
    pub fn build_webhook_uri(&self, options: &UriOptions) -> String {
        uri::build_webhook_uri(&self.config, options)
    }

    /// Assemble the request descriptor for a call.
    ///
    /// Layering: base descriptor from the URI and configuration, then
    /// the caller's options, which win on every field they set. The
    /// client's auth mode and timeout fill the remaining unset fields
    /// when the descriptor is executed.
    pub fn request_descriptor(
        &self,
        uri_options: &UriOptions,
        options: &RequestOptions,
    ) -> RequestDescriptor {
        RequestDescriptor::new(self.build_uri(uri_options), self.config.verify_tls)
            .apply(options)
    }

    /// Execute a request descriptor through the transport.
    ///
    /// The client's resolved auth mode and configured timeout fill any
    /// descriptor fields still unset; fields the descriptor carries,
    /// including caller overrides, always win. A structurally
    /// successful response that carries a non-empty `errorMessages`
    /// list is converted into [`Error::RemoteApi`] with the messages
    /// joined by `", "`. Everything else, including an empty body,
    /// passes through unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] when the transport fails,
    /// [`Error::RemoteApi`] when the response encodes a remote failure.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Option<Value>> {
        let descriptor = descriptor
            .clone()
            .with_defaults(&self.auth, self.config.timeout);

        let response = self.transport.send(&descriptor).await?;

        if let Some(message) = remote_error(response.as_ref()) {
            debug!(error = %message, "Remote API reported failure");
            return Err(Error::RemoteApi(message));
        }

        Ok(response)
    }

    /// Build the descriptor for an endpoint and execute it.
    pub async fn request(
        &self,
        uri_options: &UriOptions,
        options: &RequestOptions,
    ) -> Result<Option<Value>> {
        let descriptor = self.request_descriptor(uri_options, options);
        self.execute(&descriptor).await
    }

    /// GET an arbitrary endpoint below the versioned API path.
    ///
    /// The endpoint is taken relative to `/rest/api/{version}`, so
    /// `client.get("board").await` fetches `/rest/api/2/board`. This is
    /// the intended pattern for endpoints without a typed method.
    #[instrument(skip(self))]
    pub async fn get(&self, endpoint: &str) -> Result<Option<Value>> {
        let options = UriOptions::new(format!("/{endpoint}"));
        self.request(&options, &RequestOptions::new()).await
    }

    /// Get the current authenticated user.
    ///
    /// Calls `GET /rest/api/{version}/myself`.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<CurrentUser> {
        self.get_typed(&UriOptions::new("/myself")).await
    }

    /// Get details about the Controlla instance.
    ///
    /// Calls `GET /rest/api/{version}/serverInfo`.
    #[instrument(skip(self))]
    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.get_typed(&UriOptions::new("/serverInfo")).await
    }

    /// Get a single issue by key.
    ///
    /// # Arguments
    ///
    /// * `key` - The issue key (e.g., "CTRL-123")
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn find_issue(&self, key: &str) -> Result<Issue> {
        debug!("Fetching issue");

        let issue: Issue = self
            .get_typed(&UriOptions::new(format!("/issue/{key}")))
            .await?;

        debug!(issue = %issue.key, "Fetched issue");
        Ok(issue)
    }

    /// List all projects visible to the authenticated user.
    ///
    /// Calls `GET /rest/api/{version}/project`.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_typed(&UriOptions::new("/project")).await
    }

    /// Search for issues with a JQL query.
    ///
    /// Calls `POST /rest/api/{version}/search` with the query and any
    /// paging or field restrictions carried by the request.
    ///
    /// # Arguments
    ///
    /// * `search` - The search request, at minimum a JQL string
    #[instrument(skip(self, search), fields(jql = %search.jql))]
    pub async fn search_issues(&self, search: &SearchRequest) -> Result<SearchResult> {
        let result: SearchResult = self
            .post_typed(&UriOptions::new("/search"), search)
            .await?;

        debug!(
            found = result.issues.len(),
            total = result.total,
            "Search finished"
        );
        Ok(result)
    }

    async fn get_typed<T: DeserializeOwned>(&self, options: &UriOptions) -> Result<T> {
        let value = self.request(options, &RequestOptions::new()).await?;
        decode(value)
    }

    async fn post_typed<T: DeserializeOwned, B: Serialize>(
        &self,
        options: &UriOptions,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(Error::Encode)?;
        let request_options = RequestOptions::new()
            .with_method(Method::POST)
            .with_body(body);

        let value = self.request(options, &request_options).await?;
        decode(value)
    }
}

impl fmt::Debug for ControllaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllaClient")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Extract the joined error text from a response carrying a non-empty
/// `errorMessages` list, if any.
fn remote_error(response: Option<&Value>) -> Option<String> {
    let messages = response?.get(ERROR_MESSAGES_KEY)?.as_array()?;
    if messages.is_empty() {
        return None;
    }

    Some(
        messages
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<T> {
    let value = value.ok_or_else(|| Error::InvalidResponse("empty response body".to_string()))?;
    serde_json::from_value(value).map_err(|err| Error::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::transport::TransportError;

    /// Test transport that records every descriptor and replays a canned
    /// response.
    struct RecordingTransport {
        requests: Mutex<Vec<RequestDescriptor>>,
        response: Option<Value>,
    }

    impl RecordingTransport {
        fn returning(response: Option<Value>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response,
            })
        }

        fn last_request(&self) -> RequestDescriptor {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request was sent")
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(
            &self,
            request: &RequestDescriptor,
        ) -> std::result::Result<Option<Value>, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn client_with(
        config: ClientConfig,
        response: Option<Value>,
    ) -> (ControllaClient, Arc<RecordingTransport>) {
        let transport = RecordingTransport::returning(response);
        let client = ControllaClient::with_transport(config, transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn test_error_messages_become_remote_api_error() {
        let response = json!({"errorMessages": ["bad field", "missing id"]});
        let (client, _) = client_with(ClientConfig::new("h"), Some(response));

        let result = client.get("issue/CTRL-1").await;

        assert!(
            matches!(result, Err(Error::RemoteApi(message)) if message == "bad field, missing id")
        );
    }

    #[tokio::test]
    async fn test_empty_object_passes_through() {
        let (client, _) = client_with(ClientConfig::new("h"), Some(json!({})));

        let result = client.get("issue/CTRL-1").await.unwrap();

        assert_eq!(result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_empty_body_passes_through() {
        let (client, _) = client_with(ClientConfig::new("h"), None);

        let result = client.get("issue/CTRL-1").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_empty_error_list_is_not_an_error() {
        let response = json!({"errorMessages": [], "total": 0});
        let (client, _) = client_with(ClientConfig::new("h"), Some(response.clone()));

        let result = client.get("search").await.unwrap();

        assert_eq!(result, Some(response));
    }

    #[tokio::test]
    async fn test_generic_get_descriptor() {
        let config = ClientConfig::new("h")
            .with_basic_auth("someusername", "somepassword")
            .with_timeout(Duration::from_secs(30));
        let (client, transport) = client_with(config, Some(json!({})));

        client.get("board").await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri, "http://h/rest/api/2/board");
        assert!(request.json);
        assert!(request.verify_tls);
        assert_eq!(
            request.auth,
            Some(AuthMode::Basic {
                username: "someusername".to_string(),
                password: "somepassword".to_string(),
            })
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_caller_options_beat_client_defaults() {
        let config = ClientConfig::new("h").with_bearer("configured");
        let (client, transport) = client_with(config, Some(json!({})));

        let options = RequestOptions::new()
            .with_method(Method::DELETE)
            .with_uri("http://elsewhere/override")
            .with_auth(AuthMode::Bearer {
                token: "caller".to_string(),
            });
        client
            .request(&UriOptions::new("/issue/CTRL-1"), &options)
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.uri, "http://elsewhere/override");
        assert_eq!(
            request.auth,
            Some(AuthMode::Bearer {
                token: "caller".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_execute_fills_client_base_into_bare_descriptor() {
        let config = ClientConfig::new("h")
            .with_basic_auth("someusername", "somepassword")
            .with_timeout(Duration::from_secs(30));
        let (client, transport) = client_with(config, Some(json!({})));

        let descriptor =
            RequestDescriptor::new(client.build_uri(&UriOptions::new("/myself")), true);
        client.execute(&descriptor).await.unwrap();

        let request = transport.last_request();
        assert_eq!(
            request.auth,
            Some(AuthMode::Basic {
                username: "someusername".to_string(),
                password: "somepassword".to_string(),
            })
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_execute_keeps_descriptor_fields_over_client_base() {
        let config = ClientConfig::new("h")
            .with_basic_auth("someusername", "somepassword")
            .with_timeout(Duration::from_secs(30));
        let (client, transport) = client_with(config, Some(json!({})));

        let descriptor = RequestDescriptor::new("http://h/rest/api/2/myself", true).apply(
            &RequestOptions::new()
                .with_auth(AuthMode::Bearer {
                    token: "caller".to_string(),
                })
                .with_timeout(Duration::from_secs(1)),
        );
        client.execute(&descriptor).await.unwrap();

        let request = transport.last_request();
        assert_eq!(
            request.auth,
            Some(AuthMode::Bearer {
                token: "caller".to_string(),
            })
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_no_credentials_attach_no_auth() {
        let (client, transport) = client_with(ClientConfig::new("h"), Some(json!({})));

        client.get("myself").await.unwrap();

        assert_eq!(transport.last_request().auth, None);
    }

    #[tokio::test]
    async fn test_find_issue_decodes_typed_response() {
        let response = json!({
            "id": "10001",
            "key": "CTRL-1",
            "self": "http://h/rest/api/2/issue/10001",
            "fields": {
                "summary": "First issue",
                "status": {"id": "1", "name": "Open"},
                "issuetype": {"id": "1", "name": "Bug"}
            }
        });
        let (client, transport) = client_with(ClientConfig::new("h"), Some(response));

        let issue = client.find_issue("CTRL-1").await.unwrap();

        assert_eq!(issue.key, "CTRL-1");
        assert_eq!(issue.summary(), "First issue");
        assert_eq!(
            transport.last_request().uri,
            "http://h/rest/api/2/issue/CTRL-1"
        );
    }

    #[tokio::test]
    async fn test_search_issues_posts_body() {
        let response = json!({
            "startAt": 0,
            "maxResults": 50,
            "total": 0,
            "issues": []
        });
        let (client, transport) = client_with(ClientConfig::new("h"), Some(response));

        let search = SearchRequest::new("project = CTRL").with_max_results(50);
        let result = client.search_issues(&search).await.unwrap();

        assert_eq!(result.total, 0);
        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.uri, "http://h/rest/api/2/search");
        assert_eq!(
            request.body,
            Some(json!({"jql": "project = CTRL", "maxResults": 50}))
        );
    }

    #[tokio::test]
    async fn test_list_projects_decodes_array() {
        let response = json!([
            {"id": "10000", "key": "CTRL", "name": "Controlla"}
        ]);
        let (client, transport) = client_with(ClientConfig::new("h"), Some(response));

        let projects = client.list_projects().await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].key, "CTRL");
        assert_eq!(transport.last_request().uri, "http://h/rest/api/2/project");
    }

    #[tokio::test]
    async fn test_typed_endpoint_rejects_empty_body() {
        let (client, _) = client_with(ClientConfig::new("h"), None);

        let result = client.current_user().await;

        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_intermediate_path_reaches_descriptor() {
        let config = ClientConfig::new("h").with_intermediate_path("/custom");
        let (client, transport) = client_with(config, Some(json!({})));

        client.get("thing").await.unwrap();

        assert_eq!(transport.last_request().uri, "http://h/custom/thing");
    }

    #[test]
    fn test_uri_builders_share_configuration() {
        let config = ClientConfig::new("h").with_port(8080);
        let (client, _) = client_with(config, None);

        assert_eq!(client.config().host, "h");
        assert_eq!(client.auth_mode(), &AuthMode::None);
        assert_eq!(
            client.build_uri(&UriOptions::new("/issue")),
            "http://h:8080/rest/api/2/issue"
        );
        assert_eq!(
            client.build_webhook_uri(&UriOptions::new("/webhook/1")),
            "http://h:8080/rest/webhooks/1.0/webhook/1"
        );
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ClientConfig::new("h").with_basic_auth("someusername", "somepassword");
        let (client, _) = client_with(config, None);

        let output = format!("{:?}", client);
        assert!(output.contains("someusername"));
        assert!(!output.contains("somepassword"));
    }
}
