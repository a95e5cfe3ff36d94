//! Core traits, types, and error handling for repobot.
//!
//! This crate provides the foundational abstractions shared by the GitHub
//! client, the agent dispatcher and the CLI.

pub mod action;
pub mod config;
pub mod error;
pub mod host;
pub mod message;
pub mod types;

pub use action::{Action, ActionKind, RepoRef, ValidationError};
pub use config::{Config, Credentials, ResponseFormat};
pub use error::{Error, Result};
pub use host::RepoHost;
pub use message::{AgentResponse, RepoRequest, ResponseType, INVALID_REQUEST_MESSAGE};
pub use types::*;
