//! Action dispatch.
//!
//! This module turns a [`RepoRequest`] into exactly one [`AgentResponse`]:
//! validate the action, run its remote calls through a [`RepoHost`] and
//! render the result or the error.

use std::sync::Arc;

use repobot_core::{
    Action, AgentResponse, CreateIssueInput, RepoHost, RepoRequest, ResponseFormat, Result,
    INVALID_REQUEST_MESSAGE,
};
use tracing::{debug, info, warn};

use crate::render::{self, Document};

/// Dispatcher that executes repository actions against a host.
pub struct Dispatcher {
    host: Arc<dyn RepoHost>,
    format: ResponseFormat,
}

impl Dispatcher {
    /// Create a new dispatcher rendering plain text.
    pub fn new(host: Arc<dyn RepoHost>) -> Self {
        Self {
            host,
            format: ResponseFormat::default(),
        }
    }

    /// Set the reply format.
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Handle one request and produce its single reply.
    ///
    /// Invalid requests are answered with [`INVALID_REQUEST_MESSAGE`] without
    /// touching the host.
    pub async fn dispatch(&self, request: &RepoRequest) -> AgentResponse {
        info!(
            repo_url = %request.repo_url,
            action = %request.action,
            "Received repo request"
        );

        let message = match Action::try_from(request) {
            Ok(action) => {
                let kind = action.kind();
                match self.execute(action).await {
                    Ok(document) => document.render(self.format),
                    Err(e) => {
                        warn!(action = %kind, error = %e, "Action failed");
                        render::failure(kind, &e)
                    }
                }
            }
            Err(e) => {
                debug!(reason = %e, "Rejected request");
                INVALID_REQUEST_MESSAGE.to_string()
            }
        };

        info!(action = %request.action, message = %message, "Sending reply");
        AgentResponse::final_message(message)
    }

    /// Run a validated action and describe its result.
    ///
    /// Multi-call actions stop at the first failing call.
    pub async fn execute(&self, action: Action) -> Result<Document> {
        match action {
            Action::GetDetails { repo } => {
                let details = self.host.get_repository(&repo).await?;
                Ok(render::repo_details(&details))
            }
            Action::CreateIssue { repo, title, body } => {
                self.host
                    .create_issue(&repo, CreateIssueInput { title, body })
                    .await?;
                Ok(render::issue_created())
            }
            Action::Compare { repo, other } => {
                let first = self.host.get_repository(&repo).await?;
                let second = self.host.get_repository(&other).await?;
                Ok(render::comparison(&first, &second))
            }
            Action::ListIssues { repo } => {
                let issues = self.host.list_issues(&repo).await?;
                debug!("Got {} issues from {}", issues.len(), repo);
                Ok(render::issues(&repo, &issues))
            }
            Action::GetReadme { repo } => {
                let readme = self.host.get_readme(&repo).await?;
                Ok(render::readme(&readme))
            }
            Action::AddCollaborator { repo, username } => {
                self.host.add_collaborator(&repo, &username).await?;
                Ok(render::collaborator_added())
            }
            Action::RemoveCollaborator { repo, username } => {
                self.host.remove_collaborator(&repo, &username).await?;
                Ok(render::collaborator_removed())
            }
            Action::GetCommits { repo } => {
                let commits = self.host.list_commits(&repo).await?;
                Ok(render::commits(&repo, &commits))
            }
            Action::GetBranches { repo } => {
                let branches = self.host.list_branches(&repo).await?;
                Ok(render::branches(&repo, &branches))
            }
            Action::GetUserInfo { username } => {
                let profile = self.host.get_user(&username).await?;
                let repos = match self.host.list_user_repos(&username).await {
                    Ok(repos) => repos,
                    Err(e) => {
                        warn!(username = %username, error = %e, "Failed to list user repositories");
                        Vec::new()
                    }
                };
                Ok(render::user_info(&profile, &repos))
            }
        }
    }
}
