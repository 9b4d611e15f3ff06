//! The unit of synchronization: one configuration file

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and freshness of one configuration file.
///
/// `file_name` is unique within a node's configuration directory and
/// names the same logical configuration on every node. `file_time_utc`
/// is the only ordering signal used for conflict resolution. `content`
/// is populated only when the file's bytes are being transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileInfo {
    pub file_name: String,
    pub file_time_utc: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ConfigFileInfo {
    /// Inventory entry without content.
    pub fn new(file_name: impl Into<String>, file_time_utc: DateTime<Utc>) -> Self {
        Self {
            file_name: file_name.into(),
            file_time_utc,
            content: None,
        }
    }

    /// Entry carrying the file's text for transfer.
    pub fn with_content(
        file_name: impl Into<String>,
        file_time_utc: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_time_utc,
            content: Some(content.into()),
        }
    }

    /// Build an entry from a filesystem modification time.
    pub fn from_modified(file_name: impl Into<String>, modified: SystemTime) -> Self {
        Self::new(file_name, DateTime::<Utc>::from(modified))
    }

    /// The timestamp as a `SystemTime`, for stamping files on disk.
    pub fn modified(&self) -> SystemTime {
        SystemTime::from(self.file_time_utc)
    }

    /// Copy of this entry with the content stripped.
    pub fn without_content(&self) -> Self {
        Self::new(self.file_name.clone(), self.file_time_utc)
    }
}
