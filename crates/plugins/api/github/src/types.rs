//! GitHub API response types.
//!
//! These types represent the raw JSON responses from GitHub API.
//! They are deserialized and then mapped to domain types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Repository
// =============================================================================

/// GitHub repository representation (`GET /repos/{owner}/{repo}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
}

// =============================================================================
// Issue
// =============================================================================

/// GitHub issue representation, as returned by the issues listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
}

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    pub body: String,
}

// =============================================================================
// Contents
// =============================================================================

/// README file (`GET /repos/{owner}/{repo}/readme`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubReadme {
    #[serde(default)]
    pub path: Option<String>,
    /// Encoded file body, wrapped at 60 columns
    pub content: String,
    /// Always "base64" for files
    #[serde(default)]
    pub encoding: Option<String>,
}

// =============================================================================
// Commits and branches
// =============================================================================

/// Commit listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitHubCommitDetail,
}

/// Git-level commit data nested in a listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitDetail {
    pub message: String,
}

/// Branch listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubBranch {
    pub name: String,
}

// =============================================================================
// Users
// =============================================================================

/// Public user profile (`GET /users/{username}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
    #[serde(default)]
    pub public_repos: Option<u64>,
    #[serde(default)]
    pub twitter_username: Option<String>,
}

/// Entry of a user's repository listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepoLink {
    pub name: String,
    pub html_url: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
