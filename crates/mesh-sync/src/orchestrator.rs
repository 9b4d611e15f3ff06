//! Reconciliation orchestrator
//!
//! One sync run:
//!
//! 1. admit candidate peers by pinging all of them concurrently,
//! 2. stop if none answered,
//! 3. snapshot the local inventory,
//! 4. visit each admitted peer in turn: push what is newer here, then
//!    either propagate deletions (once per run, when armed) or pull what
//!    is newer there, then ask the peer to refresh if it gained instances,
//! 5. reload the local model if a pull added instances.
//!
//! A peer that fails mid-exchange is evicted from the client cache,
//! recorded in the report and skipped; the run goes on with the next one.

use std::sync::Arc;

use mesh_fs::ConfigFileInfo;
use mesh_rpc::{ClientCache, SyncClient};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::diff::InventoryDiff;
use crate::node::LocalNode;
use crate::peers::PeerSource;
use crate::report::{PeerSummary, SyncReport};
use crate::session::{DeletionSwitch, SyncSession};
use crate::{Error, Result};

pub const NO_CLIENTS_MESSAGE: &str = "No rpc clients found";

pub struct SyncOrchestrator<P> {
    node: Arc<LocalNode>,
    peers: P,
    clients: Arc<ClientCache>,
    deletion: DeletionSwitch,
    run_lock: Mutex<()>,
}

impl<P: PeerSource> SyncOrchestrator<P> {
    pub fn new(node: Arc<LocalNode>, peers: P, clients: Arc<ClientCache>) -> Self {
        Self {
            node,
            peers,
            clients,
            deletion: DeletionSwitch::new(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn node(&self) -> &Arc<LocalNode> {
        &self.node
    }

    pub fn clients(&self) -> &Arc<ClientCache> {
        &self.clients
    }

    /// The one-shot deletion switch; clones share state.
    pub fn deletion(&self) -> &DeletionSwitch {
        &self.deletion
    }

    /// Run one sync. Fails only if another run is in progress or the local
    /// inventory cannot be read; peer failures end up in the report.
    pub async fn sync(&self) -> Result<SyncReport> {
        let _running = self.run_lock.try_lock().map_err(|_| Error::AlreadyRunning)?;
        let mut report = SyncReport::success();

        let admitted = self.admit().await;
        if admitted.is_empty() {
            report.message(NO_CLIENTS_MESSAGE);
            return Ok(report);
        }

        let mut session = SyncSession::new(admitted, self.node.list_local().await?);
        debug!(
            peers = session.peers.len(),
            files = session.local.len(),
            "snapshotted local inventory"
        );

        for client in session.peers.clone() {
            let endpoint = client.endpoint().to_string();
            report.message(format!("Syncing configs with {endpoint}"));

            let mut summary = PeerSummary::new(&endpoint);
            match self
                .reconcile(&client, &mut session, &mut summary, &mut report)
                .await
            {
                Ok(()) => report.message(format!("Synced configs with {endpoint}")),
                Err(e) => {
                    self.clients.evict(&endpoint);
                    summary.error = Some(e.to_string());
                    report.error(format!("Failed to sync configs with {endpoint}: {e}"));
                }
            }
            report.peers.push(summary);
        }

        if session.local_needs_refresh {
            match self.node.refresh().await {
                Ok(()) => report.local_refreshed = true,
                Err(e) => report.error(format!("Failed to reload local configs: {e}")),
            }
        }

        Ok(report)
    }

    /// Connect and ping every candidate concurrently; keep those that
    /// answered, in candidate order.
    async fn admit(&self) -> Vec<Arc<SyncClient>> {
        let candidates = self.peers.candidates().await;
        debug!(candidates = candidates.len(), "admitting peers");

        let mut pings = JoinSet::new();
        for (index, endpoint) in candidates.into_iter().enumerate() {
            let clients = Arc::clone(&self.clients);
            pings.spawn(async move { (index, clients.connect(&endpoint).await) });
        }

        let mut admitted = Vec::new();
        while let Some(joined) = pings.join_next().await {
            match joined {
                Ok((index, Some(client))) => admitted.push((index, client)),
                Ok((_, None)) => {}
                Err(e) => warn!(error = %e, "peer ping task failed"),
            }
        }

        admitted.sort_by_key(|(index, _)| *index);
        admitted.into_iter().map(|(_, client)| client).collect()
    }

    async fn reconcile(
        &self,
        client: &SyncClient,
        session: &mut SyncSession,
        summary: &mut PeerSummary,
        report: &mut SyncReport,
    ) -> Result<()> {
        let endpoint = client.endpoint();
        let remote = client.get_inventory().await?;
        let diff = InventoryDiff::compute(session.local.values(), &remote);
        debug!(peer = endpoint, ?diff, "compared inventories");

        let mut remote_needs_refresh = false;

        let to_push = diff.to_push();
        if !to_push.is_empty() {
            let files = self.node.read_content(&to_push).await?;
            client.put_content(&files).await?;
            summary.sent = files.iter().map(|f| f.file_name.clone()).collect();
            report.message(format!("Sent {} files to {endpoint}", files.len()));
            remote_needs_refresh |= !diff.local_only.is_empty();
        }

        if self.deletion.take() {
            if !diff.remote_newer.is_empty() {
                let files = client.get_content(&diff.remote_newer).await?;
                self.pull(&files, session, summary, report, endpoint).await?;
            }
            if !diff.remote_only.is_empty() {
                client.delete_files(&diff.remote_only).await?;
                summary.deleted = diff.remote_only.clone();
                report.message(format!(
                    "Deleted {} files in {endpoint}",
                    diff.remote_only.len()
                ));
                remote_needs_refresh = true;
            }
        } else {
            let to_pull = diff.to_pull();
            if !to_pull.is_empty() {
                let files = client.get_content(&to_pull).await?;
                self.pull(&files, session, summary, report, endpoint).await?;
                session.local_needs_refresh |= !diff.remote_only.is_empty();
            }
        }

        if remote_needs_refresh {
            client.refresh_configs().await?;
            summary.remote_refreshed = true;
        }

        Ok(())
    }

    async fn pull(
        &self,
        files: &[ConfigFileInfo],
        session: &mut SyncSession,
        summary: &mut PeerSummary,
        report: &mut SyncReport,
        endpoint: &str,
    ) -> Result<()> {
        let written = self.node.apply_content(files).await?;
        session.record_local_writes(files);
        report.message(format!("Received {} files from {endpoint}", written.len()));
        summary.received.extend(written);
        Ok(())
    }
}
