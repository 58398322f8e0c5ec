//! Controlla API request and response types.
//!
//! These types model the Controlla REST API v2 payloads for issues,
//! projects, users, and search results. Fields the server may omit are
//! defaulted so partial payloads still deserialize.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The current authenticated user.
///
/// Returned by `GET /rest/api/2/myself`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// URL of this user resource.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The short login name.
    #[serde(default)]
    pub name: Option<String>,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be empty if hidden).
    #[serde(default)]
    pub email_address: String,
    /// Whether the user is active.
    #[serde(default = "default_true")]
    pub active: bool,
    /// The user's timezone.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// URLs for the user's avatar images.
    #[serde(default)]
    pub avatar_urls: Option<AvatarUrls>,
}

fn default_true() -> bool {
    true
}

/// Avatar URLs for a user or project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarUrls {
    /// 48x48 pixel avatar.
    #[serde(rename = "48x48")]
    pub size_48: Option<String>,
    /// 24x24 pixel avatar.
    #[serde(rename = "24x24")]
    pub size_24: Option<String>,
    /// 16x16 pixel avatar.
    #[serde(rename = "16x16")]
    pub size_16: Option<String>,
    /// 32x32 pixel avatar.
    #[serde(rename = "32x32")]
    pub size_32: Option<String>,
}

/// Server details.
///
/// Returned by `GET /rest/api/2/serverInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Base URL the instance is served from.
    pub base_url: String,
    /// Version string, e.g. `9.4.0`.
    pub version: String,
    /// Version as numeric components.
    #[serde(default)]
    pub version_numbers: Vec<u32>,
    /// Deployment type, e.g. `Server` or `Cloud`.
    #[serde(default)]
    pub deployment_type: Option<String>,
    /// Build number.
    #[serde(default)]
    pub build_number: Option<u64>,
    /// Build date.
    #[serde(default)]
    pub build_date: Option<String>,
    /// Current server time.
    #[serde(default)]
    pub server_time: Option<String>,
    /// Instance title.
    #[serde(default)]
    pub server_title: Option<String>,
}

/// Search request body for `POST /rest/api/2/search`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// The JQL query string.
    pub jql: String,
    /// Index of the first result to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    /// Maximum number of results to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Restrict returned issues to these fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl SearchRequest {
    /// A search request for a JQL query with server-side defaults for
    /// paging and fields.
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            ..Self::default()
        }
    }

    /// Set the index of the first result.
    #[must_use]
    pub fn with_start_at(mut self, start_at: u32) -> Self {
        self.start_at = Some(start_at);
        self
    }

    /// Set the maximum number of results.
    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Restrict returned issues to the given fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Search result for a JQL query.
///
/// Returned by `POST /rest/api/2/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The index of the first result.
    pub start_at: u32,
    /// Maximum results requested.
    pub max_results: u32,
    /// Total number of matching issues.
    pub total: u32,
    /// The matching issues.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// A Controlla issue.
///
/// Returned by `GET /rest/api/2/issue/{issueKey}` or as part of search
/// results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// The issue ID.
    pub id: String,
    /// The issue key (e.g., "CTRL-123").
    pub key: String,
    /// URL of this issue resource.
    #[serde(rename = "self")]
    pub self_url: String,
    /// The issue fields.
    pub fields: IssueFields,
}

impl Issue {
    /// Get the issue summary.
    pub fn summary(&self) -> &str {
        &self.fields.summary
    }

    /// Get the issue status name.
    pub fn status(&self) -> &str {
        &self.fields.status.name
    }

    /// Get the assignee display name, if assigned.
    pub fn assignee(&self) -> Option<&str> {
        self.fields
            .assignee
            .as_ref()
            .map(|user| user.display_name.as_str())
    }

    /// Get the description as plain text, or an empty string if unset.
    ///
    /// API v2 sends descriptions as plain strings; other versions may
    /// send structured documents, which render as empty here.
    pub fn description_text(&self) -> &str {
        self.fields
            .description
            .as_ref()
            .and_then(|value| value.as_str())
            .unwrap_or_default()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.fields.summary)
    }
}

/// Issue fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
    /// The issue summary/title.
    pub summary: String,
    /// The issue description.
    #[serde(default)]
    pub description: Option<serde_json::Value>,
    /// The issue status.
    pub status: Status,
    /// The issue type (Bug, Story, Task, etc.).
    pub issuetype: IssueType,
    /// The issue priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// The issue assignee.
    #[serde(default)]
    pub assignee: Option<User>,
    /// The issue reporter.
    #[serde(default)]
    pub reporter: Option<User>,
    /// The project this issue belongs to.
    #[serde(default)]
    pub project: Option<Project>,
    /// Labels attached to the issue.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Components the issue is associated with.
    #[serde(default)]
    pub components: Vec<Component>,
    /// When the issue was created.
    #[serde(default)]
    pub created: Option<String>,
    /// When the issue was last updated.
    #[serde(default)]
    pub updated: Option<String>,
    /// When the issue is due.
    #[serde(default)]
    pub duedate: Option<String>,
}

/// Issue status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// The status ID.
    pub id: String,
    /// The status name (e.g., "To Do", "In Progress", "Done").
    pub name: String,
    /// The status category.
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Status category (groups statuses into to-do, in-progress, done).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCategory {
    /// The category ID.
    pub id: u32,
    /// The category key.
    pub key: String,
    /// The category name.
    pub name: String,
    /// The category color.
    #[serde(default)]
    pub color_name: Option<String>,
}

/// Issue type (Bug, Story, Task, Epic, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    /// The issue type ID.
    pub id: String,
    /// The issue type name.
    pub name: String,
    /// Whether this is a subtask type.
    #[serde(default)]
    pub subtask: bool,
    /// The issue type description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Issue priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    /// The priority ID.
    pub id: String,
    /// The priority name (e.g., "Highest", "High", "Medium", "Low").
    pub name: String,
}

/// A Controlla user reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's account ID, on instances that expose one.
    #[serde(default)]
    pub account_id: Option<String>,
    /// The short login name.
    #[serde(default)]
    pub name: Option<String>,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be empty).
    #[serde(default)]
    pub email_address: Option<String>,
    /// Whether the user is active.
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A Controlla project.
///
/// Returned by `GET /rest/api/2/project` as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The project ID.
    pub id: String,
    /// The project key (e.g., "CTRL").
    pub key: String,
    /// The project name.
    pub name: String,
    /// The project type key, e.g. `software`.
    #[serde(default)]
    pub project_type_key: Option<String>,
    /// URLs for the project's avatar images.
    #[serde(default)]
    pub avatar_urls: Option<AvatarUrls>,
}

/// A project component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// The component ID.
    pub id: String,
    /// The component name.
    pub name: String,
    /// The component description.
    #[serde(default)]
    pub description: Option<String>,
}
