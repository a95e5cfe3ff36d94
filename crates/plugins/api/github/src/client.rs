//! GitHub API client implementation.

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::{Method, StatusCode};
use repobot_core::config::GitHubConfig;
use repobot_core::{
    Branch, CommitSummary, CreateIssueInput, Credentials, Error, IssueSummary, Readme, RepoHost,
    RepoLink, RepoRef, Repository, Result, UserProfile,
};
use tracing::{debug, warn};

use crate::types::{
    CreateIssueRequest, GitHubBranch, GitHubCommit, GitHubErrorBody, GitHubIssue, GitHubReadme,
    GitHubRepoLink, GitHubRepository, GitHubUser,
};
use crate::DEFAULT_GITHUB_URL;

/// GitHub API client.
pub struct GitHubClient {
    base_url: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(DEFAULT_GITHUB_URL, credentials)
    }

    /// Create a new GitHub client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repobot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }

    /// Create a client from the `[github]` config section.
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_GITHUB_URL);
        Self::with_base_url(base_url, config.credentials())
    }

    /// Build request with common headers.
    fn request(&self, method: Method, url: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Get the repository API URL for a given endpoint.
    fn repo_url(&self, repo: &RepoRef, endpoint: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, repo.path(), endpoint)
    }

    /// Get the API URL for a given endpoint (non-repository-scoped).
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request and require `expected` as the response status.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        expected: StatusCode,
    ) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if status != expected {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                expected = expected.as_u16(),
                "GitHub API error response"
            );
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Make an authenticated GET request with typed deserialization.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = url, "GitHub GET request");

        let response = self
            .send(
                self.request(Method::GET, url, self.credentials.read()),
                StatusCode::OK,
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }
}

/// Build an API error from a non-success response body.
///
/// Uses the body's `message` field, or `HTTP {status}` when there is none.
fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<GitHubErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));

    Error::Api { status, message }
}

// =============================================================================
// Mapping functions: GitHub types -> domain types
// =============================================================================

fn map_repository(gh_repo: GitHubRepository) -> Repository {
    Repository {
        name: gh_repo.name,
        description: gh_repo.description,
        stars: gh_repo.stargazers_count,
        forks: gh_repo.forks_count,
        open_issues: gh_repo.open_issues_count,
    }
}

fn map_issue(gh_issue: GitHubIssue) -> IssueSummary {
    IssueSummary {
        number: gh_issue.number,
        title: gh_issue.title,
    }
}

fn map_commit(gh_commit: GitHubCommit) -> CommitSummary {
    CommitSummary {
        sha: gh_commit.sha,
        message: gh_commit.commit.message,
    }
}

fn map_user(gh_user: GitHubUser) -> UserProfile {
    UserProfile {
        login: gh_user.login,
        name: gh_user.name,
        company: gh_user.company,
        location: gh_user.location,
        bio: gh_user.bio,
        followers: gh_user.followers,
        following: gh_user.following,
        public_repos: gh_user.public_repos,
        twitter_username: gh_user.twitter_username,
        html_url: gh_user.html_url,
    }
}

/// Decode README contents.
///
/// GitHub wraps the base64 payload with newlines, which are dropped before
/// decoding.
fn decode_readme(gh_readme: GitHubReadme) -> Result<Readme> {
    if let Some(encoding) = gh_readme.encoding.as_deref() {
        if encoding != "base64" {
            return Err(Error::InvalidData(format!(
                "Unsupported README encoding: {}",
                encoding
            )));
        }
    }

    let packed: String = gh_readme
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = BASE64_STANDARD
        .decode(packed)
        .map_err(|e| Error::InvalidData(format!("Failed to decode README: {}", e)))?;

    let content = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidData(format!("README is not valid UTF-8: {}", e)))?;

    Ok(Readme {
        path: gh_readme.path,
        content,
    })
}

// =============================================================================
// RepoHost implementation
// =============================================================================

#[async_trait]
impl RepoHost for GitHubClient {
    async fn get_repository(&self, repo: &RepoRef) -> Result<Repository> {
        let gh_repo: GitHubRepository = self.get(&self.repo_url(repo, "")).await?;
        Ok(map_repository(gh_repo))
    }

    async fn create_issue(&self, repo: &RepoRef, input: CreateIssueInput) -> Result<()> {
        let url = self.repo_url(repo, "/issues");
        debug!(url = %url, "GitHub POST request");

        let body = CreateIssueRequest {
            title: input.title,
            body: input.body,
        };

        self.send(
            self.request(Method::POST, &url, self.credentials.issue())
                .json(&body),
            StatusCode::CREATED,
        )
        .await?;

        Ok(())
    }

    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<IssueSummary>> {
        let gh_issues: Vec<GitHubIssue> = self.get(&self.repo_url(repo, "/issues")).await?;
        Ok(gh_issues.into_iter().map(map_issue).collect())
    }

    async fn get_readme(&self, repo: &RepoRef) -> Result<Readme> {
        let gh_readme: GitHubReadme = self.get(&self.repo_url(repo, "/readme")).await?;
        decode_readme(gh_readme)
    }

    async fn add_collaborator(&self, repo: &RepoRef, username: &str) -> Result<()> {
        let url = self.repo_url(repo, &format!("/collaborators/{}", username));
        debug!(url = %url, "GitHub PUT request");

        self.send(
            self.request(Method::PUT, &url, self.credentials.read()),
            StatusCode::CREATED,
        )
        .await?;

        Ok(())
    }

    async fn remove_collaborator(&self, repo: &RepoRef, username: &str) -> Result<()> {
        let url = self.repo_url(repo, &format!("/collaborators/{}", username));
        debug!(url = %url, "GitHub DELETE request");

        self.send(
            self.request(Method::DELETE, &url, self.credentials.read()),
            StatusCode::NO_CONTENT,
        )
        .await?;

        Ok(())
    }

    async fn list_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>> {
        let gh_commits: Vec<GitHubCommit> = self.get(&self.repo_url(repo, "/commits")).await?;
        Ok(gh_commits.into_iter().map(map_commit).collect())
    }

    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<Branch>> {
        let gh_branches: Vec<GitHubBranch> = self.get(&self.repo_url(repo, "/branches")).await?;
        Ok(gh_branches
            .into_iter()
            .map(|b| Branch { name: b.name })
            .collect())
    }

    async fn get_user(&self, username: &str) -> Result<UserProfile> {
        let gh_user: GitHubUser = self.get(&self.api_url(&format!("/users/{}", username))).await?;
        Ok(map_user(gh_user))
    }

    async fn list_user_repos(&self, username: &str) -> Result<Vec<RepoLink>> {
        let gh_repos: Vec<GitHubRepoLink> = self
            .get(&self.api_url(&format!("/users/{}/repos", username)))
            .await?;
        Ok(gh_repos
            .into_iter()
            .map(|r| RepoLink {
                name: r.name,
                html_url: r.html_url,
            })
            .collect())
    }
}
