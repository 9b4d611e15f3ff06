//! Four-way inventory comparison

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mesh_fs::ConfigFileInfo;
use serde::Serialize;

/// How a local and a remote inventory differ.
///
/// Every name present on either side lands in at most one bucket. Names
/// present on both sides with equal timestamps are in sync and land in
/// none, whatever their content. All buckets are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryDiff {
    pub local_only: Vec<String>,
    pub remote_only: Vec<String>,
    pub local_newer: Vec<String>,
    pub remote_newer: Vec<String>,
}

impl InventoryDiff {
    pub fn compute<'a, L, R>(local: L, remote: R) -> Self
    where
        L: IntoIterator<Item = &'a ConfigFileInfo>,
        R: IntoIterator<Item = &'a ConfigFileInfo>,
    {
        let local = times(local);
        let remote = times(remote);
        let mut diff = Self::default();

        for (name, local_time) in &local {
            match remote.get(name) {
                None => diff.local_only.push(name.clone()),
                Some(remote_time) if local_time > remote_time => {
                    diff.local_newer.push(name.clone())
                }
                Some(remote_time) if remote_time > local_time => {
                    diff.remote_newer.push(name.clone())
                }
                Some(_) => {}
            }
        }

        diff.remote_only = remote
            .keys()
            .filter(|name| !local.contains_key(*name))
            .cloned()
            .collect();

        diff
    }

    /// Names to send to the peer.
    pub fn to_push(&self) -> Vec<String> {
        merged(&self.local_only, &self.local_newer)
    }

    /// Names to fetch from the peer.
    pub fn to_pull(&self) -> Vec<String> {
        merged(&self.remote_only, &self.remote_newer)
    }

    pub fn is_in_sync(&self) -> bool {
        self.local_only.is_empty()
            && self.remote_only.is_empty()
            && self.local_newer.is_empty()
            && self.remote_newer.is_empty()
    }
}

fn times<'a>(files: impl IntoIterator<Item = &'a ConfigFileInfo>) -> BTreeMap<String, DateTime<Utc>> {
    files
        .into_iter()
        .map(|f| (f.file_name.clone(), f.file_time_utc))
        .collect()
}

fn merged(a: &[String], b: &[String]) -> Vec<String> {
    let mut names: Vec<String> = a.iter().chain(b).cloned().collect();
    names.sort();
    names
}
