//! Test utilities for freezone development.
//!
//! Provides the deterministic allocation-size workload used by the
//! integration tests and benchmarks ([`size_sequence`], [`requests`]), the
//! two operations that drive it over a heap ([`allocate_all`],
//! [`release_all`]), and assertion helpers for heap state.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod workload;

pub use workload::{allocate_all, release_all, requests, size_sequence, Allocation, WorkloadError};

use freezone::{Heap, HeapError};

/// Free blocks of `heap` as `(offset, size)` pairs, lowest first.
///
/// An exhausted heap yields an empty vector.
///
/// # Panics
///
/// Panics if the heap is not initialized.
pub fn free_layout(heap: &Heap) -> Vec<(usize, usize)> {
    match heap.free_blocks() {
        Ok(blocks) => blocks.map(|s| (s.address.offset(), s.size)).collect(),
        Err(HeapError::Empty) => Vec::new(),
        Err(e) => panic!("free_layout on unusable heap: {e}"),
    }
}

/// Panic with the violated invariant if `heap` is inconsistent.
pub fn assert_heap_consistent(heap: &Heap) {
    if let Err(violation) = heap.check_invariants() {
        panic!(
            "heap invariant violated: {violation}\nfree layout: {:?}",
            free_layout(heap)
        );
    }
}
