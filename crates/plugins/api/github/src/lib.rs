//! GitHub repository host for repobot.
//!
//! This crate implements [`repobot_core::RepoHost`] on top of the GitHub
//! REST API: repositories, issues, README, collaborators, commits,
//! branches and user profiles.

mod client;
mod types;

pub use client::GitHubClient;
pub use types::*;

/// Default GitHub API URL.
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
