//! Repository agent for repobot.
//!
//! This crate implements the agent that receives repository requests over
//! JSON-RPC, runs them against a repository host and answers each one with
//! a single human-readable reply.

pub mod dispatcher;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use server::AgentServer;
