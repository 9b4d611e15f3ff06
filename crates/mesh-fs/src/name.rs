//! File name validation
//!
//! Names arrive from remote peers, so they must resolve to an entry
//! directly inside the configuration directory and nowhere else.

use crate::{Error, Result};

/// Check that `name` is a plain file name.
///
/// Rejects empty names, path separators of either platform, parent
/// references, drive prefixes, and hidden names (the atomic writer uses
/// dot-prefixed temp files).
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_name(name, "empty name"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::invalid_name(name, "contains a path separator"));
    }
    if name == "." || name == ".." {
        return Err(Error::invalid_name(name, "refers to a directory"));
    }
    if name.starts_with('.') {
        return Err(Error::invalid_name(name, "hidden file names are reserved"));
    }
    if name.contains(':') {
        return Err(Error::invalid_name(name, "contains a drive or stream separator"));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::invalid_name(name, "contains control characters"));
    }
    Ok(())
}
