//! The closed set of repository actions and request validation.
//!
//! A [`RepoRequest`] is loosely typed: every optional field may or may not be
//! present. Converting it into an [`Action`] proves that the fields the chosen
//! action needs are there, before any network call is made.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::message::RepoRequest;

/// Host prefix stripped from repository and profile URLs.
const HOST_PREFIX: &str = "github.com/";

// =============================================================================
// Repository reference
// =============================================================================

/// An `owner/name` repository path derived from a URL.
///
/// Only string splitting is applied; a malformed URL yields a malformed path
/// and the remote host reports the error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    path: String,
}

impl RepoRef {
    /// Derive a reference from a repository URL.
    pub fn from_url(url: &str) -> Self {
        Self {
            path: after_host(url),
        }
    }

    /// The `owner/name` path used in API URLs.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Text after the last host prefix, or the whole input when there is none.
fn after_host(value: &str) -> String {
    value
        .trim()
        .rsplit(HOST_PREFIX)
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string()
}

// =============================================================================
// Action identifiers
// =============================================================================

/// Identifier of a supported action, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    GetDetails,
    CreateIssue,
    Compare,
    ListIssues,
    GetReadme,
    AddCollaborator,
    RemoveCollaborator,
    GetCommits,
    GetBranches,
    GetUserInfo,
}

impl ActionKind {
    /// Every supported action.
    pub const ALL: [ActionKind; 10] = [
        ActionKind::GetDetails,
        ActionKind::CreateIssue,
        ActionKind::Compare,
        ActionKind::ListIssues,
        ActionKind::GetReadme,
        ActionKind::AddCollaborator,
        ActionKind::RemoveCollaborator,
        ActionKind::GetCommits,
        ActionKind::GetBranches,
        ActionKind::GetUserInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::GetDetails => "get_details",
            ActionKind::CreateIssue => "create_issue",
            ActionKind::Compare => "compare",
            ActionKind::ListIssues => "list_issues",
            ActionKind::GetReadme => "get_readme",
            ActionKind::AddCollaborator => "add_collaborator",
            ActionKind::RemoveCollaborator => "remove_collaborator",
            ActionKind::GetCommits => "get_commits",
            ActionKind::GetBranches => "get_branches",
            ActionKind::GetUserInfo => "get_user_info",
        }
    }

    /// Request fields that must be non-empty for this action.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ActionKind::GetDetails
            | ActionKind::ListIssues
            | ActionKind::GetReadme
            | ActionKind::GetCommits
            | ActionKind::GetBranches => &["repo_url"],
            ActionKind::CreateIssue => &["repo_url", "issue_title", "issue_body"],
            ActionKind::Compare => &["repo_url", "compare_repo_url"],
            ActionKind::AddCollaborator | ActionKind::RemoveCollaborator => {
                &["repo_url", "collaborator_username"]
            }
            // Targets a user, not a repository
            ActionKind::GetUserInfo => &["user_info"],
        }
    }

    /// Human-readable summary, published in the agent manifest.
    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::GetDetails => "Fetch name, description, stars, forks and open issues",
            ActionKind::CreateIssue => "Open a new issue with a title and body",
            ActionKind::Compare => "Compare the details of two repositories",
            ActionKind::ListIssues => "List the repository's open issues",
            ActionKind::GetReadme => "Fetch and decode the repository README",
            ActionKind::AddCollaborator => "Invite a user as collaborator",
            ActionKind::RemoveCollaborator => "Remove a collaborator",
            ActionKind::GetCommits => "List recent commits",
            ActionKind::GetBranches => "List branches",
            ActionKind::GetUserInfo => "Fetch a user's profile and public repositories",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAction(s.to_string()))
    }
}

// =============================================================================
// Validated actions
// =============================================================================

/// Why a request was rejected before dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' requires field '{field}'")]
    MissingField {
        action: ActionKind,
        field: &'static str,
    },
}

/// A validated request: one variant per action, carrying only what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetDetails {
        repo: RepoRef,
    },
    CreateIssue {
        repo: RepoRef,
        title: String,
        body: String,
    },
    Compare {
        repo: RepoRef,
        other: RepoRef,
    },
    ListIssues {
        repo: RepoRef,
    },
    GetReadme {
        repo: RepoRef,
    },
    AddCollaborator {
        repo: RepoRef,
        username: String,
    },
    RemoveCollaborator {
        repo: RepoRef,
        username: String,
    },
    GetCommits {
        repo: RepoRef,
    },
    GetBranches {
        repo: RepoRef,
    },
    GetUserInfo {
        username: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::GetDetails { .. } => ActionKind::GetDetails,
            Action::CreateIssue { .. } => ActionKind::CreateIssue,
            Action::Compare { .. } => ActionKind::Compare,
            Action::ListIssues { .. } => ActionKind::ListIssues,
            Action::GetReadme { .. } => ActionKind::GetReadme,
            Action::AddCollaborator { .. } => ActionKind::AddCollaborator,
            Action::RemoveCollaborator { .. } => ActionKind::RemoveCollaborator,
            Action::GetCommits { .. } => ActionKind::GetCommits,
            Action::GetBranches { .. } => ActionKind::GetBranches,
            Action::GetUserInfo { .. } => ActionKind::GetUserInfo,
        }
    }
}

impl TryFrom<&RepoRequest> for Action {
    type Error = ValidationError;

    fn try_from(req: &RepoRequest) -> Result<Self, Self::Error> {
        let kind: ActionKind = req.action.trim().parse()?;
        let field = |name: &'static str, value: Option<&str>| -> Result<String, ValidationError> {
            match value.map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(ValidationError::MissingField {
                    action: kind,
                    field: name,
                }),
            }
        };
        let repo = || field("repo_url", Some(req.repo_url.as_str())).map(|url| RepoRef::from_url(&url));

        let action = match kind {
            ActionKind::GetDetails => Action::GetDetails { repo: repo()? },
            ActionKind::CreateIssue => Action::CreateIssue {
                repo: repo()?,
                title: field("issue_title", req.issue_title.as_deref())?,
                body: field("issue_body", req.issue_body.as_deref())?,
            },
            ActionKind::Compare => Action::Compare {
                repo: repo()?,
                other: RepoRef::from_url(&field(
                    "compare_repo_url",
                    req.compare_repo_url.as_deref(),
                )?),
            },
            ActionKind::ListIssues => Action::ListIssues { repo: repo()? },
            ActionKind::GetReadme => Action::GetReadme { repo: repo()? },
            ActionKind::AddCollaborator => Action::AddCollaborator {
                repo: repo()?,
                username: field("collaborator_username", req.collaborator_username.as_deref())?,
            },
            ActionKind::RemoveCollaborator => Action::RemoveCollaborator {
                repo: repo()?,
                username: field("collaborator_username", req.collaborator_username.as_deref())?,
            },
            ActionKind::GetCommits => Action::GetCommits { repo: repo()? },
            ActionKind::GetBranches => Action::GetBranches { repo: repo()? },
            ActionKind::GetUserInfo => {
                let value = field("user_info", req.user_info.as_deref())?;
                let username = after_host(&value);
                if username.is_empty() {
                    return Err(ValidationError::MissingField {
                        action: kind,
                        field: "user_info",
                    });
                }
                Action::GetUserInfo { username }
            }
        };

        Ok(action)
    }
}

// =============================================================================
// Tests
// =============================================================================
