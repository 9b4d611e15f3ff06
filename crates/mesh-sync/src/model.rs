//! In-memory instance model
//!
//! The list of configured instances a front end displays. It is updated
//! by reconciliation and by local refreshes, and pushes a snapshot to
//! every subscriber after each change.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::service::ServiceStatus;

/// One configured instance as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub name: String,
    pub status: ServiceStatus,
    pub selected: bool,
}

type Subscriber = Box<dyn Fn(&[InstanceEntry]) + Send + Sync>;

/// Ordered list of instances with change notification.
#[derive(Default)]
pub struct ConfigList {
    entries: Vec<InstanceEntry>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for ConfigList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigList")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ConfigList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[InstanceEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<InstanceEntry> {
        self.entries.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&InstanceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn selected(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Register a callback that receives a snapshot after every change.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&[InstanceEntry]) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Replace the list with `names`, in the given order.
    ///
    /// Instances that survive keep their selection. When the set of names
    /// is unchanged only the statuses are refreshed.
    pub fn reload(&mut self, names: &[String], statuses: &HashMap<String, ServiceStatus>) {
        let status_of =
            |name: &str| statuses.get(name).copied().unwrap_or(ServiceStatus::NotInstalled);

        let unchanged = self.entries.len() == names.len()
            && self.entries.iter().zip(names).all(|(e, n)| &e.name == n);

        if unchanged {
            for entry in &mut self.entries {
                entry.status = status_of(&entry.name);
            }
        } else {
            let selected: Vec<String> = self.selected();
            self.entries = names
                .iter()
                .map(|name| InstanceEntry {
                    name: name.clone(),
                    status: status_of(name),
                    selected: selected.contains(name),
                })
                .collect();
        }

        self.notify();
    }

    /// Drop an instance. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        let removed = self.entries.len() != before;
        if removed {
            self.notify();
        }
        removed
    }

    pub fn set_status(&mut self, name: &str, status: ServiceStatus) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            return false;
        };
        if entry.status != status {
            entry.status = status;
            self.notify();
        }
        true
    }

    pub fn select(&mut self, name: &str, selected: bool) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            return false;
        };
        if entry.selected != selected {
            entry.selected = selected;
            self.notify();
        }
        true
    }

    fn notify(&self) {
        for subscriber in &self.subscribers {
            subscriber(&self.entries);
        }
    }
}
