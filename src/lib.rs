//! plexiglass library interface
//!
//! Layered settings for command line tools: an auto-vivifying settings tree,
//! an env-aware flag parser, and helpers for logging, workspaces and service
//! integrations.
//!
//! # Module Organization
//!
//! - [`tree`] - Ordered, auto-vivifying settings tree (AutoTree, Node)
//! - [`cli`] - Flag parser that defaults long flags from the environment
//! - [`integrations`] - Flag groups for external services
//! - [`errors`] - Error types (PlexiglassError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ident;
pub mod integrations;
pub mod logging;
pub mod status;
pub mod time;
pub mod tree;
pub mod workspace;

pub use errors::{PlexiglassError, Result};
pub use tree::{AutoTree, Node};
