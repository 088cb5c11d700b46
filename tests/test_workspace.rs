//! Workspace integration tests

use std::fs;
use std::io::Write;

use plexiglass::cli::EnvCommand;
use plexiglass::workspace::{self, Workspace};
use plexiglass::PlexiglassError;
use tempfile::TempDir;

fn configure(root: &std::path::Path) -> Workspace {
    let command = workspace::configure_parser(EnvCommand::new("wstest")).build();
    let matches = command
        .try_get_matches_from(["wstest", "--workspace-dir", root.to_str().unwrap()])
        .unwrap();
    Workspace::from_matches(&matches, &[]).unwrap()
}

#[test]
fn test_basic() {
    let tmp = TempDir::new().unwrap();
    let ws = configure(tmp.path());

    assert!(tmp.path().join("uuid").exists());
    assert!(!ws.check_error_flag());
    ws.set_error_flag().unwrap();
    assert!(ws.check_error_flag());

    assert!(!ws.exists_file("download", "help").unwrap());
    ws.create_file("download", "help", |f| f.write_all(b"hello world")).unwrap();
    assert!(ws.exists_file("download", "help").unwrap());

    let target = ws.dir("download").unwrap().join("help");
    assert_eq!(fs::read_to_string(target).unwrap(), "hello world");
}

#[test]
fn test_create_file_returns_writer_result() {
    let tmp = TempDir::new().unwrap();
    let ws = configure(tmp.path());

    let written = ws
        .create_file("upload", "report.txt", |f| {
            f.write_all(b"abc")?;
            Ok(3usize)
        })
        .unwrap();
    assert_eq!(written, 3);

    // Overwrites replace the whole file
    ws.create_file("upload", "report.txt", |f| f.write_all(b"z")).unwrap();
    assert_eq!(fs::read_to_string(tmp.path().join("upload/report.txt")).unwrap(), "z");
}

#[test]
fn test_bad_workspace() {
    let tmp = TempDir::new().unwrap();
    let ws = configure(tmp.path());

    assert!(matches!(
        ws.exists_file("non-existent", "nope"),
        Err(PlexiglassError::InvalidWorkspace(name)) if name == "non-existent"
    ));

    let mut called = false;
    let result = ws.create_file("non-existent", "nope", |_| {
        called = true;
        Ok(())
    });
    assert!(matches!(result, Err(PlexiglassError::InvalidWorkspace(_))));
    assert!(!called);
}

#[test]
fn test_missing_workspace_flag() {
    let command = workspace::configure_parser(EnvCommand::new("wstest")).build();
    assert!(command.try_get_matches_from(["wstest"]).is_err());
}
