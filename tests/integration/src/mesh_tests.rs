//! Multi-node scenarios over loopback TCP
//!
//! Each node has its own configuration directory and serves the sync
//! service on an ephemeral port; runs are driven the way a front end
//! drives them, through [`mesh_sync::SyncOrchestrator`].

mod harness;

use std::sync::Arc;

use harness::{BrokenInventory, MeshNode, SECRET, serve};
use mesh_fs::ConfigFileInfo;
use mesh_rpc::{RpcError, SharedSecret, SyncClient};
use mesh_test_utils::utc;
use pretty_assertions::assert_eq;

// ============================================================================
// Convergence
// ============================================================================

#[tokio::test]
async fn test_three_nodes_converge_in_two_runs() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    let c = MeshNode::new();
    a.dir.write_instance("alpha", "", utc(100));
    b.dir.write_instance("bravo", "", utc(200));
    c.dir.write_instance("charlie", "", utc(300));
    let b_addr = b.serve().await;
    let c_addr = c.serve().await;
    let a_addr = a.serve().await;

    // A learns bravo from B before visiting C, so C gets both.
    let report = a.orchestrator(&[&b_addr, &c_addr]).sync().await.unwrap();
    assert!(report.success);
    assert_eq!(a.dir.names(), vec!["alpha.toml", "bravo.toml", "charlie.toml"]);
    assert_eq!(c.dir.names(), vec!["alpha.toml", "bravo.toml", "charlie.toml"]);
    assert_eq!(b.dir.names(), vec!["alpha.toml", "bravo.toml"]);

    b.orchestrator(&[&a_addr, &c_addr]).sync().await.unwrap();
    for node in [&a, &b, &c] {
        assert_eq!(node.dir.names(), vec!["alpha.toml", "bravo.toml", "charlie.toml"]);
        node.dir
            .assert_file("charlie.toml", "instance_name = \"charlie\"\n", utc(300));
    }
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    a.dir.write_instance("alpha", "", utc(100));
    b.dir.write_instance("bravo", "", utc(200));
    let b_addr = b.serve().await;
    let sync = a.orchestrator(&[&b_addr]);

    let first = sync.sync().await.unwrap();
    assert_eq!((first.files_sent(), first.files_received()), (1, 1));

    let second = sync.sync().await.unwrap();
    assert!(second.success);
    assert_eq!((second.files_sent(), second.files_received()), (0, 0));
    assert!(!second.local_refreshed);
    assert_eq!(a.dir.mtime("bravo.toml"), utc(200));
}

// ============================================================================
// Conflict resolution
// ============================================================================

#[tokio::test]
async fn test_newest_copy_wins_across_peers() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    let c = MeshNode::new();
    a.dir.write_instance("shared", "v = 1\n", utc(100));
    b.dir.write_instance("shared", "v = 2\n", utc(200));
    c.dir.write_instance("shared", "v = 3\n", utc(150));
    let b_addr = b.serve().await;
    let c_addr = c.serve().await;

    let report = a.orchestrator(&[&b_addr, &c_addr]).sync().await.unwrap();

    assert!(report.success);
    for node in [&a, &b, &c] {
        node.dir
            .assert_file("shared.toml", "instance_name = \"shared\"\nv = 2\n", utc(200));
    }
    assert_eq!(report.peer(&c_addr).unwrap().sent, vec!["shared.toml"]);
    assert_eq!(a.services.restarted(), vec!["shared"]);
    assert_eq!(c.services.restarted(), vec!["shared"]);
}

#[tokio::test]
async fn test_content_and_timestamp_survive_the_wire() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    let content = "instance_name = \"ünïcode\"\r\nnetwork = \"mesh-网络\"\r\n# no trailing newline";
    b.dir.write_file("ünïcode.toml", content, utc(1_700_000_123));
    let b_addr = b.serve().await;

    a.orchestrator(&[&b_addr]).sync().await.unwrap();

    a.dir.assert_file("ünïcode.toml", content, utc(1_700_000_123));
}

// ============================================================================
// Deletion propagation
// ============================================================================

#[tokio::test]
async fn test_deletion_applies_to_first_peer_only() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    let c = MeshNode::new();
    for node in [&a, &b, &c] {
        node.dir.write_instance("kept", "", utc(100));
    }
    b.dir.write_instance("stale", "", utc(100));
    c.dir.write_instance("fresh", "", utc(100));
    let b_addr = b.serve().await;
    let c_addr = c.serve().await;

    let sync = a.orchestrator(&[&b_addr, &c_addr]);
    sync.deletion().arm();
    let report = sync.sync().await.unwrap();

    assert!(report.success);
    assert!(!sync.deletion().is_armed());
    assert_eq!(b.dir.names(), vec!["kept.toml"]);
    assert_eq!(b.services.removed(), vec!["stale"]);
    // C is visited in the normal pull phase.
    assert_eq!(a.dir.names(), vec!["fresh.toml", "kept.toml"]);
    assert!(c.services.removed().is_empty());
    assert_eq!(report.files_deleted(), 1);
}

#[tokio::test]
async fn test_deletion_passes_to_next_peer_when_first_fails_early() {
    let a = MeshNode::new();
    let broken = MeshNode::new();
    let c = MeshNode::new();
    for node in [&a, &broken, &c] {
        node.dir.write_instance("kept", "", utc(100));
    }
    broken.dir.write_instance("untouched", "", utc(100));
    c.dir.write_instance("extra", "", utc(100));
    let broken_addr = serve(Arc::new(BrokenInventory(Arc::clone(&broken.node))), SECRET).await;
    let c_addr = c.serve().await;

    let sync = a.orchestrator(&[&broken_addr, &c_addr]);
    sync.deletion().arm();
    let report = sync.sync().await.unwrap();

    // The first peer fails before its deletion phase, so the switch is
    // still armed when the second peer is reached.
    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with(&format!("Failed to sync configs with {broken_addr}")));
    assert!(!sync.deletion().is_armed());
    assert_eq!(report.peer(&c_addr).unwrap().deleted, vec!["extra.toml"]);
    assert_eq!(c.dir.names(), vec!["kept.toml"]);
    assert_eq!(c.services.removed(), vec!["extra"]);
    assert_eq!(broken.dir.names(), vec!["kept.toml", "untouched.toml"]);
    assert!(broken.services.removed().is_empty());
    assert_eq!(a.dir.names(), vec!["kept.toml"]);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_foreign_group_cannot_read_or_write() {
    let b = MeshNode::new();
    b.dir.write_instance("private", "", utc(100));
    let b_addr = b.serve().await;
    let intruder = SyncClient::new(b_addr, SharedSecret::new("not-the-secret"));

    assert!(matches!(intruder.ping().await, Err(RpcError::Unauthenticated)));
    assert!(matches!(
        intruder.get_inventory().await,
        Err(RpcError::Unauthenticated)
    ));
    let planted = ConfigFileInfo::with_content("planted.toml", utc(1), "x = 1\n");
    assert!(matches!(
        intruder.put_content(&[planted]).await,
        Err(RpcError::Unauthenticated)
    ));
    assert!(matches!(
        intruder.delete_files(&["private.toml".to_string()]).await,
        Err(RpcError::Unauthenticated)
    ));

    assert_eq!(b.dir.names(), vec!["private.toml"]);
    assert!(b.services.removed().is_empty());
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_failing_peer_does_not_stop_the_run() {
    let a = MeshNode::new();
    let b = MeshNode::new();
    let broken = MeshNode::new();
    let d = MeshNode::new();
    a.dir.write_instance("alpha", "", utc(100));
    b.dir.write_instance("bravo", "", utc(100));
    d.dir.write_instance("delta", "", utc(100));
    let b_addr = b.serve().await;
    let broken_addr = serve(Arc::new(BrokenInventory(Arc::clone(&broken.node))), SECRET).await;
    let d_addr = d.serve().await;

    let sync = a.orchestrator(&[&b_addr, &broken_addr, &d_addr]);
    let report = sync.sync().await.unwrap();

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with(&format!("Failed to sync configs with {broken_addr}")));
    assert!(report.peer(&broken_addr).unwrap().error.is_some());
    assert!(sync.clients().get(&broken_addr).is_none());
    assert!(sync.clients().get(&d_addr).is_some());

    assert_eq!(a.dir.names(), vec!["alpha.toml", "bravo.toml", "delta.toml"]);
    assert_eq!(d.dir.names(), vec!["alpha.toml", "bravo.toml", "delta.toml"]);
    assert!(broken.dir.names().is_empty());
}
