//! Integration test: hand-placed rings with known positions.

use ringmap_integration_tests::{PinnedHasher, assert_sorted};
use ringmap_placement::{Ring, RingError};

/// Three nodes sorting `n2 < n1 < n3`, one key between `n2` and `n1`.
fn three_node_ring() -> Ring<PinnedHasher> {
    let ring = Ring::with_hasher(PinnedHasher::new(&[
        ("n2", 0x1000_0000),
        ("n1", 0x5000_0000),
        ("n3", 0x9000_0000),
        ("k", 0x3000_0000),
        ("past-end", 0xF000_0000),
    ]));
    for id in ["n1", "n2", "n3"] {
        ring.add_node(id);
    }
    ring
}

#[test]
fn test_key_follows_successor_as_nodes_leave() {
    let ring = three_node_ring();
    assert_eq!(ring.get("k").unwrap(), "n1");

    ring.remove_node("n1").unwrap();
    assert_eq!(ring.get("k").unwrap(), "n3");

    ring.remove_node("n3").unwrap();
    assert_eq!(ring.get("k").unwrap(), "n2");

    ring.remove_node("n2").unwrap();
    assert_eq!(ring.get("k"), Err(RingError::EmptyRing));
}

#[test]
fn test_key_past_last_node_wraps_to_first() {
    let ring = three_node_ring();
    assert_eq!(ring.get("past-end").unwrap(), "n2");

    // Still wraps to whichever node is now lowest.
    ring.remove_node("n2").unwrap();
    assert_eq!(ring.get("past-end").unwrap(), "n1");
}

#[test]
fn test_node_positions_listed_in_ring_order() {
    let ring = three_node_ring();
    let ids: Vec<String> = ring.nodes().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["n2", "n1", "n3"]);
    assert_sorted(&ring);
}

#[test]
fn test_removing_absent_node_leaves_ring_untouched() {
    let ring = three_node_ring();
    let before = ring.nodes();

    assert_eq!(
        ring.remove_node("past-end"),
        Err(RingError::NodeNotFound("past-end".to_string()))
    );
    assert_eq!(ring.nodes(), before);
}

#[test]
fn test_readding_node_restores_ownership() {
    let ring = three_node_ring();
    ring.remove_node("n1").unwrap();
    assert_eq!(ring.get("k").unwrap(), "n3");

    assert!(ring.add_node("n1"));
    assert!(!ring.add_node("n1"));
    assert_eq!(ring.get("k").unwrap(), "n1");
    assert_eq!(ring.len(), 3);
}
