//! Repository host trait.

use async_trait::async_trait;

use crate::action::RepoRef;
use crate::error::Result;
use crate::types::{
    Branch, CommitSummary, CreateIssueInput, IssueSummary, Readme, RepoLink, Repository,
    UserProfile,
};

/// Remote service exposing repositories, issues, commits, branches and users.
///
/// Every method performs exactly one remote call. Sequencing several calls
/// for one action is the dispatcher's job.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Get repository details
    async fn get_repository(&self, repo: &RepoRef) -> Result<Repository>;

    /// Open a new issue
    async fn create_issue(&self, repo: &RepoRef, input: CreateIssueInput) -> Result<()>;

    /// List issues in the order the host returns them
    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<IssueSummary>>;

    /// Get the decoded README
    async fn get_readme(&self, repo: &RepoRef) -> Result<Readme>;

    /// Invite a collaborator
    async fn add_collaborator(&self, repo: &RepoRef, username: &str) -> Result<()>;

    /// Remove a collaborator
    async fn remove_collaborator(&self, repo: &RepoRef, username: &str) -> Result<()>;

    /// List recent commits
    async fn list_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>>;

    /// List branches
    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<Branch>>;

    /// Get a user's public profile
    async fn get_user(&self, username: &str) -> Result<UserProfile>;

    /// List a user's public repositories
    async fn list_user_repos(&self, username: &str) -> Result<Vec<RepoLink>>;
}
