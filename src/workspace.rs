//! Workspaces for tools to store and process artifacts
//!
//! A workspace root gets one subdirectory per named workspace:
//!
//! ```text
//! /path/to/workspace/{debug,download,upload,...}
//! /path/to/workspace/uuid
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgMatches};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::cli::EnvCommand;
use crate::errors::{PlexiglassError, Result};
use crate::ident::get_uuid;
use crate::tree::{AutoTree, Node};

/// Workspaces created for every tool
pub const DEFAULT_WORKSPACES: [&str; 3] = ["debug", "download", "upload"];

const ERROR_FLAG: &str = "error";

/// Add the required `--workspace-dir` flag
pub fn configure_parser(command: EnvCommand) -> EnvCommand {
    command.arg(
        Arg::new("workspace_dir")
            .long("workspace-dir")
            .value_name("DIR")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Directory to house workspaces"),
    )
}

/// A bootstrapped workspace root
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    dirs: AutoTree,
    owner_id: String,
}

impl Workspace {
    /// Create the default and `extra` workspaces under `root`
    ///
    /// Also loads (or creates) the owner id cached in `root/uuid`.
    pub fn configure(root: impl Into<PathBuf>, extra: &[&str]) -> Result<Self> {
        let root = root.into();
        let mut dirs = AutoTree::strict();

        for name in DEFAULT_WORKSPACES.iter().chain(extra) {
            let dir = root.join(name);
            fs::create_dir_all(&dir)?;
            debug!(workspace = %name, path = %dir.display(), "workspace ready");
            dirs.set_item(*name, dir.to_string_lossy().to_string());
        }

        let owner_id = get_uuid(Some(&root.join("uuid")))?;
        info!(root = %root.display(), owner_id = %owner_id, "workspace configured");

        Ok(Self {
            root,
            dirs,
            owner_id,
        })
    }

    /// Configure from a parsed `--workspace-dir`
    pub fn from_matches(matches: &ArgMatches, extra: &[&str]) -> Result<Self> {
        let root = matches
            .get_one::<PathBuf>("workspace_dir")
            .ok_or_else(|| PlexiglassError::Argument("--workspace-dir is required".to_string()))?;
        Self::configure(root.clone(), extra)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Workspace name to directory path
    pub fn dirs(&self) -> &AutoTree {
        &self.dirs
    }

    /// Directory of a named workspace
    pub fn dir(&self, workspace: &str) -> Result<PathBuf> {
        self.dirs
            .get(workspace)
            .and_then(Node::as_str)
            .map(PathBuf::from)
            .ok_or_else(|| PlexiglassError::InvalidWorkspace(workspace.to_string()))
    }

    /// Write `fname` in a workspace atomically
    ///
    /// `write` fills a temporary file in the target directory, which is then
    /// renamed over the destination, so readers never see a partial file. If
    /// `write` fails the temporary file is removed and the destination is
    /// left alone.
    pub fn create_file<T, F>(&self, workspace: &str, fname: &str, write: F) -> Result<T>
    where
        F: FnOnce(&mut File) -> std::io::Result<T>,
    {
        let dir = self.dir(workspace)?;
        let target = dir.join(fname);

        let mut temp = NamedTempFile::new_in(&dir)?;
        let result = write(temp.as_file_mut())?;
        temp.as_file_mut().flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| PlexiglassError::Io(e.error))?;

        debug!(path = %target.display(), "file created");
        Ok(result)
    }

    /// Whether `fname` exists in a workspace
    pub fn exists_file(&self, workspace: &str, fname: &str) -> Result<bool> {
        Ok(self.dir(workspace)?.join(fname).exists())
    }

    /// Whether the workspace was flagged for manual intervention
    pub fn check_error_flag(&self) -> bool {
        self.error_flag_path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn set_error_flag(&self) -> Result<()> {
        File::create(self.error_flag_path()?)?;
        Ok(())
    }

    fn error_flag_path(&self) -> Result<PathBuf> {
        Ok(self.dir("debug")?.join(ERROR_FLAG))
    }
}
