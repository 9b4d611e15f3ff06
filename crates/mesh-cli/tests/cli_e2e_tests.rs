//! End-to-end tests that invoke the compiled `meshsync` binary.
//!
//! Every invocation gets its own settings file and a scrubbed environment
//! so the user's configuration never leaks in.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command as StdCommand, Stdio};

use assert_cmd::Command;
use mesh_test_utils::{TestConfigDir, utc};
use predicates::prelude::*;
use tempfile::TempDir;

const SECRET: &str = "e2e-secret";

fn std_meshsync(home: &Path) -> StdCommand {
    let mut cmd = StdCommand::new(env!("CARGO_BIN_EXE_meshsync"));
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MESHSYNC_SECRET")
        .env_remove("MESHSYNC_CONFIG_DIR")
        .env_remove("MESHSYNC_PORT")
        .env_remove("MESHSYNC_MESH_CLI")
        .env("MESHSYNC_CONFIG", home.join("settings.toml"));
    cmd
}

fn meshsync(home: &Path) -> Command {
    Command::from_std(std_meshsync(home))
}

/// A `meshsync serve` child process, killed on drop.
struct ServeProcess {
    child: Child,
    endpoint: String,
}

impl ServeProcess {
    fn start(home: &Path, configs: &Path) -> Self {
        let mut child = std_meshsync(home)
            .args(["serve", "--bind", "127.0.0.1:0", "--secret", SECRET])
            .arg("--config-dir")
            .arg(configs)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start meshsync serve");

        // "Serving sync service on <addr> for <dir>"
        let stdout = child.stdout.take().expect("piped stdout");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("failed to read serve banner");
        let endpoint = line
            .split_whitespace()
            .nth(4)
            .expect("serve banner carries the address")
            .to_string();

        Self { child, endpoint }
    }
}

impl Drop for ServeProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    meshsync(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("inventory"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    meshsync(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("meshsync"));
}

#[test]
fn test_completions_for_bash() {
    let home = TempDir::new().unwrap();
    meshsync(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("meshsync"));
}

#[test]
fn test_no_command_prints_hint() {
    let home = TempDir::new().unwrap();
    meshsync(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("meshsync --help"));
}

#[test]
fn test_inventory_json_lists_files_without_content() {
    let home = TempDir::new().unwrap();
    let configs = TestConfigDir::new();
    configs.write_instance("office", "", utc(1_700_000_000));
    configs.write_file("notes.txt", "shared too", utc(1_700_000_050));

    let output = meshsync(home.path())
        .arg("--config-dir")
        .arg(configs.path())
        .args(["inventory", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let files: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = files
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["fileName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["notes.txt", "office.toml"]);
    assert!(files[0].get("content").is_none());
}

#[test]
fn test_status_shows_instances() {
    let home = TempDir::new().unwrap();
    let configs = TestConfigDir::new();
    configs.write_instance("office", "", utc(1));

    meshsync(home.path())
        .arg("--config-dir")
        .arg(configs.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("office"))
        .stdout(predicate::str::contains("Running"));
}

#[test]
fn test_settings_json_masks_secret() {
    let home = TempDir::new().unwrap();
    let output = meshsync(home.path())
        .env("MESHSYNC_SECRET", "hunter2")
        .args(["settings", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["sync_secret"], "********");
    assert_eq!(settings["rpc_port"], 16666);
}

#[test]
fn test_settings_save_persists_overrides() {
    let home = TempDir::new().unwrap();
    meshsync(home.path())
        .args(["settings", "--save", "--port", "17001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    assert!(home.path().join("settings.toml").exists());
    meshsync(home.path())
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("17001"));
}

#[test]
fn test_sync_with_unreachable_peer_finds_no_clients() {
    let home = TempDir::new().unwrap();
    let configs = TestConfigDir::new();

    meshsync(home.path())
        .arg("--config-dir")
        .arg(configs.path())
        .args(["--secret", SECRET, "sync", "--peer", "127.0.0.1:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rpc clients found"));
}

#[test]
fn test_sync_between_two_processes() {
    let remote_home = TempDir::new().unwrap();
    let remote = TestConfigDir::new();
    remote.write_instance("lab", "", utc(1_700_000_100));

    let local_home = TempDir::new().unwrap();
    let local = TestConfigDir::new();
    local.write_instance("office", "", utc(1_700_000_200));

    let server = ServeProcess::start(remote_home.path(), remote.path());

    meshsync(local_home.path())
        .arg("--config-dir")
        .arg(local.path())
        .args(["--secret", SECRET, "sync", "--peer", &server.endpoint])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Synced configs with {}",
            server.endpoint
        )))
        .stdout(predicate::str::contains("1 sent, 1 received"));

    local.assert_file("lab.toml", "instance_name = \"lab\"\n", utc(1_700_000_100));
    remote.assert_file(
        "office.toml",
        "instance_name = \"office\"\n",
        utc(1_700_000_200),
    );
}

#[test]
fn test_sync_with_wrong_secret_is_refused() {
    let remote_home = TempDir::new().unwrap();
    let remote = TestConfigDir::new();
    remote.write_instance("lab", "", utc(1_700_000_100));
    let server = ServeProcess::start(remote_home.path(), remote.path());

    let local_home = TempDir::new().unwrap();
    let local = TestConfigDir::new();

    meshsync(local_home.path())
        .arg("--config-dir")
        .arg(local.path())
        .args(["--secret", "wrong", "sync", "--peer", &server.endpoint])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rpc clients found"));

    assert!(local.names().is_empty());
}
