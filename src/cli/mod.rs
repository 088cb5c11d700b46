//! Command-line scaffolding with environment-variable defaults

pub mod command;

// Re-exports
pub use command::{EnvCommand, EnvDefault, FlagGroup};
