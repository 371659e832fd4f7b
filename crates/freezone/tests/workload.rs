//! Integration test: the generated size workload over repeated cycles.
//!
//! Runs allocate-all / release-all over `size_sequence` many times and
//! checks that the heap returns to a single spanning block every cycle,
//! including when a partial release leaves holes for the next round.

use freezone::{Heap, HeapConfig, HeapError};
use freezone_test_utils::{
    allocate_all, assert_heap_consistent, free_layout, release_all, requests,
};

const CAPACITY: usize = 64 * 1024;
const SEED: usize = 4096;

#[test]
fn full_cycles_return_to_spanning_block() {
    let mut heap = Heap::init(CAPACITY).unwrap();
    let mut reqs = requests(SEED);
    assert!(!reqs.is_empty());
    for _ in 0..20 {
        allocate_all(&mut heap, &mut reqs).unwrap();
        assert_heap_consistent(&heap);
        release_all(&mut heap, &mut reqs).unwrap();
        assert_eq!(free_layout(&heap), vec![(0, CAPACITY)]);
    }
}

#[test]
fn partial_release_then_refill() {
    let mut heap = Heap::init(CAPACITY).unwrap();
    let mut reqs = requests(SEED);
    allocate_all(&mut heap, &mut reqs).unwrap();

    // Release every third request, then allocate them again into the holes.
    for round in 0..5 {
        let mut subset: Vec<_> = reqs
            .iter()
            .skip(round % 3)
            .step_by(3)
            .cloned()
            .collect();
        release_all(&mut heap, &mut subset).unwrap();
        assert_heap_consistent(&heap);
        allocate_all(&mut heap, &mut subset).unwrap();
        assert_heap_consistent(&heap);
        for updated in subset {
            let idx = updated.idx;
            reqs[idx] = updated;
        }
    }

    release_all(&mut heap, &mut reqs).unwrap();
    assert_eq!(free_layout(&heap), vec![(0, CAPACITY)]);
}

#[test]
fn trusted_mode_runs_the_same_workload() {
    let mut heap = Heap::with_config(HeapConfig::new(CAPACITY).trusted()).unwrap();
    let mut reqs = requests(SEED);
    allocate_all(&mut heap, &mut reqs).unwrap();
    release_all(&mut heap, &mut reqs).unwrap();
    assert_eq!(free_layout(&heap), vec![(0, CAPACITY)]);
    assert_heap_consistent(&heap);
}

#[test]
fn destroyed_heap_rejects_workload() {
    let mut heap = Heap::init(CAPACITY).unwrap();
    let mut reqs = requests(SEED);
    allocate_all(&mut heap, &mut reqs).unwrap();
    heap.destroy().unwrap();
    let err = release_all(&mut heap, &mut reqs).unwrap_err();
    assert_eq!(err.idx, 0);
    assert_eq!(err.source, HeapError::NotInitialized);
}
