//! Inbound request and outbound reply messages.

use serde::{Deserialize, Serialize};

/// Reply text for an unknown action or a request missing required fields.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid action or missing required fields.";

/// A request naming one repository action and its parameters.
///
/// Which optional fields matter depends on `action`; see [`crate::Action`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoRequest {
    /// URL of the repository, e.g. `https://github.com/owner/repo`
    #[serde(default)]
    pub repo_url: String,
    /// Action identifier, e.g. `get_details`
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborator_username: Option<String>,
    /// Second repository URL, only for `compare`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_repo_url: Option<String>,
    /// Username (or profile URL), only for `get_user_info`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<String>,
}

impl RepoRequest {
    /// Create a request for `action` against `repo_url`.
    pub fn new(repo_url: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            action: action.into(),
            ..Default::default()
        }
    }
}

/// Marks whether a reply is final or intermediate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    #[default]
    Final,
}

/// The single reply produced for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub message: String,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
}

impl AgentResponse {
    /// Create a final reply.
    pub fn final_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response_type: ResponseType::Final,
        }
    }
}
