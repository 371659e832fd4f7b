//! Benchmark profiles for the freezone allocator.
//!
//! Provides pre-built heaps and operation scripts for benchmarking:
//!
//! - [`fragmented_heap`]: a heap whose free list is a long run of holes
//! - [`churn_script`]: a seeded mix of allocations and frees

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use freezone::{Address, Heap};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build a heap of `capacity` bytes whose lower half is cut into
/// `block`-byte allocations with every other one freed.
///
/// Returns the heap and the still-live addresses. The free list holds about
/// `capacity / (4 * block)` holes followed by one large tail block, so a
/// request larger than `block` walks every hole before it lands in the tail.
pub fn fragmented_heap(capacity: usize, block: usize) -> (Heap, Vec<Address>) {
    let mut heap = Heap::init(capacity).unwrap();
    let count = capacity / 2 / block;
    let addrs: Vec<Address> = (0..count)
        .map(|_| heap.allocate(block).unwrap())
        .collect();
    let mut live = Vec::with_capacity(count / 2);
    for (i, address) in addrs.into_iter().enumerate() {
        if i % 2 == 0 {
            heap.free(address, block).unwrap();
        } else {
            live.push(address);
        }
    }
    (heap, live)
}

/// One step of a churn script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnOp {
    /// Allocate this many bytes.
    Alloc(usize),
    /// Free the live allocation at this index, modulo the live count.
    Free(usize),
}

/// A deterministic script of `len` operations with sizes in `1..=max_size`.
///
/// Roughly three allocations for every two frees, so the live set grows
/// slowly and the heap sees both splitting and coalescing.
pub fn churn_script(seed: u64, len: usize, max_size: usize) -> Vec<ChurnOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.next_u32() % 5 < 3 {
                ChurnOp::Alloc(1 + (rng.next_u64() as usize) % max_size)
            } else {
                ChurnOp::Free(rng.next_u64() as usize)
            }
        })
        .collect()
}

/// Play `script` against `heap`, returning how many allocations failed.
///
/// Every allocation still live at the end is freed again, so the heap is
/// back in its starting shape when this returns.
pub fn run_churn(heap: &mut Heap, script: &[ChurnOp]) -> usize {
    let mut live: Vec<(Address, usize)> = Vec::new();
    let mut refused = 0;
    for &op in script {
        match op {
            ChurnOp::Alloc(size) => match heap.allocate(size) {
                Ok(address) => live.push((address, size)),
                Err(_) => refused += 1,
            },
            ChurnOp::Free(pick) => {
                if !live.is_empty() {
                    let (address, size) = live.swap_remove(pick % live.len());
                    heap.free(address, size).unwrap();
                }
            }
        }
    }
    for (address, size) in live {
        heap.free(address, size).unwrap();
    }
    refused
}
