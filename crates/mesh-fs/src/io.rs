//! Atomic I/O operations with file locking

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial
/// file. Every call gets its own uniquely named temp file, so concurrent
/// writers of the same path never share one. When `modified` is given,
/// the temp file is stamped with it before the rename, so the visible
/// file carries that time and never the wall-clock time of the write.
pub fn write_atomic(path: &Path, content: &[u8], modified: Option<SystemTime>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    // Hidden prefix keeps in-flight temps out of the inventory
    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;

    let temp_path = temp.path().to_path_buf();
    write_temp(temp.as_file_mut(), &temp_path, path, content, modified)?;

    // Dropping the handle on failure removes the temp file
    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn write_temp(
    temp_file: &mut File,
    temp_path: &Path,
    target: &Path,
    content: &[u8],
    modified: Option<SystemTime>,
) -> Result<()> {
    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    if let Some(time) = modified {
        temp_file
            .set_modified(time)
            .map_err(|e| Error::io(temp_path, e))?;
    }

    FileExt::unlock(&*temp_file).map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically, stamping it with the current time.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), None)
}

/// Last modification time of a file.
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| Error::io(path, e))
}
