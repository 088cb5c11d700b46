//! Common test utilities for plexiglass integration tests
//!
//! Runs the built binary in a scratch environment and captures its output.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliResponse {
    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout is not JSON")
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Scratch environment for one CLI run
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Temporary workspace root
    pub workspace_dir: TempDir,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().expect("Failed to create temp config dir"),
            workspace_dir: TempDir::new().expect("Failed to create temp workspace dir"),
            env_vars: HashMap::new(),
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }

    pub fn workspace(&self) -> &Path {
        self.workspace_dir.path()
    }

    /// Write a file into the config directory
    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }
}

/// Run the CLI with `--workspace-dir` pointing at a scratch directory
pub fn plexiglass(args: &[&str]) -> CliResponse {
    let env = MockEnvironment::new();
    let mut full = vec!["--workspace-dir", env.workspace().to_str().expect("utf-8 temp path")];
    full.extend_from_slice(args);
    plexiglass_with_env(&full, &env)
}

/// Run the CLI with exactly `args` in the given environment
pub fn plexiglass_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plexiglass"));
    cmd.args(args);

    cmd.env("PLEXIGLASS_CONFIG_DIR", env.config_path());
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    parse_output(cmd.output().expect("Failed to execute command"))
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}
