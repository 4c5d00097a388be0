//! Integration test: concurrent readers and writers on one shared ring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringmap_integration_tests::{assert_sorted, key_set, node_name, populated_ring};
use ringmap_placement::Ring;

/// Readers hammer `get` while writers churn membership.
/// The permanent nodes guarantee every lookup succeeds.
#[test]
#[ntest::timeout(30000)]
fn test_lookups_never_fail_during_churn() {
    let ring = Arc::new(populated_ring(4));
    let done = Arc::new(AtomicBool::new(false));
    let keys = Arc::new(key_set(1_000));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let ring = Arc::clone(&ring);
            let done = Arc::clone(&done);
            let keys = Arc::clone(&keys);
            thread::spawn(move || {
                let mut lookups = 0usize;
                while !done.load(Ordering::Relaxed) {
                    for key in keys.iter() {
                        ring.get(key).expect("permanent nodes keep the ring non-empty");
                        lookups += 1;
                    }
                }
                lookups
            })
        })
        .collect();

    let writers: Vec<_> = (0..3u64)
        .map(|w| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(w);
                for _ in 0..500 {
                    let id = format!("churn-{w}-{}", rng.random_range(0..16u32));
                    if !ring.add_node(id.clone()) {
                        ring.remove_node(&id).expect("present node must be removable");
                    }
                }
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    for r in readers {
        assert!(r.join().unwrap() > 0);
    }

    assert_sorted(&ring);
    for i in 0..4 {
        assert!(ring.contains(&node_name(i)));
    }
}

/// Disjoint writers each add then remove their own nodes.
/// Final membership must equal the starting membership.
#[test]
#[ntest::timeout(30000)]
fn test_concurrent_add_remove_round_trip() {
    let ring = Arc::new(populated_ring(8));
    let before = ring.nodes();

    let writers: Vec<_> = (0..8)
        .map(|w| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..100 {
                    let id = format!("temp-{w}-{i}");
                    assert!(ring.add_node(id.clone()));
                    ring.remove_node(&id).unwrap();
                }
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }

    assert_eq!(ring.nodes(), before);
}

/// Many threads adding the same identifier create exactly one entry.
#[test]
#[ntest::timeout(30000)]
fn test_racing_duplicate_adds_create_one_entry() {
    let ring = Arc::new(Ring::new());

    let added: usize = (0..16)
        .map(|_| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || ring.add_node("contended"))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| usize::from(h.join().unwrap()))
        .sum();

    assert_eq!(added, 1);
    assert_eq!(ring.len(), 1);
}
