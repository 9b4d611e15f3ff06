//! Local configuration inventory
//!
//! The configuration directory holds one `<instance>.toml` per mesh
//! instance. For synchronization every regular, non-hidden file counts,
//! keyed by its file name including the extension.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigFileInfo, Error, Result, io, validate_file_name};

/// Extension of instance configuration files.
pub const CONFIG_EXTENSION: &str = "toml";

/// Inventory of one node's configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigInventory {
    dir: PathBuf,
}

impl ConfigInventory {
    /// Create an inventory rooted at `dir`. The directory does not have to exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The configuration directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the configuration file for an instance name.
    pub fn config_path(&self, instance: &str) -> PathBuf {
        self.dir.join(format!("{instance}.{CONFIG_EXTENSION}"))
    }

    /// List every file in the directory with its modification time.
    ///
    /// A missing directory is an empty inventory. Entries come back
    /// sorted by name and without content.
    pub fn list_local(&self) -> Result<Vec<ConfigFileInfo>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if validate_file_name(&name).is_err() {
                continue;
            }

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                // Removed between readdir and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(entry.path(), e)),
            };
            if !meta.is_file() {
                continue;
            }

            let modified = meta.modified().map_err(|e| Error::io(entry.path(), e))?;
            files.push(ConfigFileInfo::from_modified(name, modified));
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    /// Read the named files with their content and current modification time.
    ///
    /// Files that vanished since the inventory was taken are skipped.
    pub fn read_content(&self, names: &[String]) -> Result<Vec<ConfigFileInfo>> {
        let mut files = Vec::with_capacity(names.len());

        for name in names {
            validate_file_name(name)?;
            let path = self.dir.join(name);

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(file = %name, "skipping file that disappeared before read");
                    continue;
                }
                Err(e) => return Err(Error::io(&path, e)),
            };
            let modified = match io::modified_time(&path) {
                Ok(modified) => modified,
                Err(Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };

            let mut info = ConfigFileInfo::from_modified(name.clone(), modified);
            info.content = Some(content);
            files.push(info);
        }

        Ok(files)
    }

    /// Write each file's content and stamp it with the entry's timestamp.
    ///
    /// All names and contents are validated before the first write so a
    /// bad entry never leaves a half-applied batch. Returns the names written.
    pub fn write_content(&self, files: &[ConfigFileInfo]) -> Result<Vec<String>> {
        for file in files {
            validate_file_name(&file.file_name)?;
            if file.content.is_none() {
                return Err(Error::MissingContent {
                    name: file.file_name.clone(),
                });
            }
        }

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let content = file.content.as_deref().unwrap_or_default();
            let path = self.dir.join(&file.file_name);
            io::write_atomic(&path, content.as_bytes(), Some(file.modified()))?;
            debug!(file = %file.file_name, time = %file.file_time_utc, "wrote config file");
            written.push(file.file_name.clone());
        }

        Ok(written)
    }

    /// Delete the named files. Missing files are not an error.
    ///
    /// Returns the names that were actually removed.
    pub fn delete(&self, names: &[String]) -> Result<Vec<String>> {
        for name in names {
            validate_file_name(name)?;
        }

        let mut removed = Vec::new();
        for name in names {
            let path = self.dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %name, "deleted config file");
                    removed.push(name.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&path, e)),
            }
        }

        Ok(removed)
    }

    /// Names of the instances configured in the directory (`*.toml` stems).
    pub fn instance_names(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self
            .list_local()?
            .into_iter()
            .filter_map(|info| instance_name(&info.file_name).map(str::to_owned))
            .collect();
        Ok(names.into_iter().collect())
    }
}

/// Instance name for a configuration file name, if it is a `.toml` file.
pub fn instance_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(CONFIG_EXTENSION)?.strip_suffix('.')?;
    (!stem.is_empty()).then_some(stem)
}
