//! Process-wide cache of admitted peer clients

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info};

use crate::auth::SharedSecret;
use crate::client::{DEFAULT_CALL_TIMEOUT, DEFAULT_PING_TIMEOUT, SyncClient};

/// Clients keyed by endpoint.
///
/// A client enters the cache only after a successful ping. Cached clients
/// are pinged again on every [`ClientCache::connect`], keeping their
/// connection. Entries leave the cache when that ping or a call through
/// them fails ([`ClientCache::evict`]) or when the secret changes.
#[derive(Debug)]
pub struct ClientCache {
    secret: RwLock<SharedSecret>,
    ping_timeout: Duration,
    call_timeout: Duration,
    clients: Mutex<HashMap<String, Arc<SyncClient>>>,
}

impl ClientCache {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret: RwLock::new(secret),
            ping_timeout: DEFAULT_PING_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_timeouts(mut self, ping_timeout: Duration, call_timeout: Duration) -> Self {
        self.ping_timeout = ping_timeout;
        self.call_timeout = call_timeout;
        self
    }

    /// Return the cached client for `endpoint`, or build one and admit it,
    /// provided it answers a ping within the ping timeout. `None` means the
    /// peer is not usable for this run.
    pub async fn connect(&self, endpoint: &str) -> Option<Arc<SyncClient>> {
        if let Some(client) = self.get(endpoint) {
            return match client.ping().await {
                Ok(true) => {
                    debug!(endpoint, "reusing cached client");
                    Some(client)
                }
                Ok(false) => {
                    debug!(endpoint, "cached peer declined ping");
                    self.evict(endpoint);
                    None
                }
                Err(e) => {
                    debug!(endpoint, error = %e, "cached peer stopped answering");
                    self.evict(endpoint);
                    None
                }
            };
        }

        let secret = self
            .secret
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let client = SyncClient::new(endpoint, secret)
            .with_timeouts(self.ping_timeout, self.call_timeout);

        let pinged = client.ping().await;
        match pinged {
            Ok(true) => {
                let mut clients = self.lock_clients();
                let client = clients
                    .entry(endpoint.to_string())
                    .or_insert_with(|| Arc::new(client));
                Some(Arc::clone(client))
            }
            Ok(false) => {
                debug!(endpoint, "peer declined ping");
                None
            }
            Err(e) => {
                debug!(endpoint, error = %e, "peer not admitted");
                None
            }
        }
    }

    /// Cached client for `endpoint`, without connecting.
    pub fn get(&self, endpoint: &str) -> Option<Arc<SyncClient>> {
        self.lock_clients().get(endpoint).cloned()
    }

    /// Drop the cached client for `endpoint`.
    pub fn evict(&self, endpoint: &str) -> bool {
        let removed = self.lock_clients().remove(endpoint).is_some();
        if removed {
            debug!(endpoint, "evicted cached client");
        }
        removed
    }

    /// Replace the shared secret. Cached clients carry the old one and
    /// are dropped.
    pub fn set_secret(&self, secret: SharedSecret) {
        *self.secret.write().unwrap_or_else(PoisonError::into_inner) = secret;
        let mut clients = self.lock_clients();
        if !clients.is_empty() {
            info!(count = clients.len(), "sync secret changed, dropping cached clients");
        }
        clients.clear();
    }

    pub fn len(&self) -> usize {
        self.lock_clients().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Endpoints currently cached, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self.lock_clients().keys().cloned().collect();
        endpoints.sort();
        endpoints
    }

    fn lock_clients(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<SyncClient>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
