//! [`TestConfigDir`] for synchronization scenarios.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

/// Whole-second UTC timestamp, the granularity test files are pinned to.
pub fn utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A temporary configuration directory.
///
/// # Example
///
/// ```rust,no_run
/// use mesh_test_utils::{TestConfigDir, utc};
///
/// let dir = TestConfigDir::new();
/// dir.write_file("office.toml", "instance_name = \"office\"\n", utc(1_700_000_000));
/// assert_eq!(dir.mtime("office.toml"), utc(1_700_000_000));
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Write `content` to `name` and pin its modification time to `time`.
    pub fn write_file(&self, name: &str, content: &str, time: DateTime<Utc>) {
        let path = self.file_path(name);
        fs::write(&path, content).unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::from(time)).unwrap();
    }

    /// Write `<instance>.toml` with an `instance_name` line and any extra lines.
    pub fn write_instance(&self, instance: &str, extra: &str, time: DateTime<Utc>) {
        let content = format!("instance_name = \"{instance}\"\n{extra}");
        self.write_file(&format!("{instance}.toml"), &content, time);
    }

    pub fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.file_path(name)).ok()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    pub fn mtime(&self, name: &str) -> DateTime<Utc> {
        let modified = fs::metadata(self.file_path(name))
            .unwrap()
            .modified()
            .unwrap();
        DateTime::<Utc>::from(modified)
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.file_path(name)).unwrap();
    }

    /// Regular file names in the directory, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Assert that `name` holds `content` stamped with `time`.
    pub fn assert_file(&self, name: &str, content: &str, time: DateTime<Utc>) {
        assert_eq!(
            self.read(name).as_deref(),
            Some(content),
            "unexpected content in {name}"
        );
        assert_eq!(self.mtime(name), time, "unexpected mtime on {name}");
    }
}
