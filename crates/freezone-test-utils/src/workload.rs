//! Deterministic allocation workloads.
//!
//! The size generator splits `n` recursively: the sizes for `n / 4`, then
//! `n / 2` itself (for `n >= 8`), then the sizes for `n / 6`. The result is
//! a short, reproducible mix of large and small requests with repeats, which
//! exercises splitting, exact matches and coalescing without any RNG.

use std::error::Error;
use std::fmt;

use freezone::{Address, Heap, HeapError};

/// Allocation sizes generated from seed `n`.
///
/// `size_sequence(n)` is empty for `n < 8`.
pub fn size_sequence(n: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    push_sizes(n, &mut sizes);
    sizes
}

fn push_sizes(n: usize, sizes: &mut Vec<usize>) {
    if n <= 3 {
        return;
    }
    push_sizes(n / 4, sizes);
    if n >= 8 {
        sizes.push(n / 2);
    }
    push_sizes(n / 6, sizes);
}

/// One request in a workload and, once allocated, where it landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Position in the workload.
    pub idx: usize,
    /// Where the block was allocated, or `None` if it is not live.
    pub address: Option<Address>,
    /// Requested size in bytes.
    pub size: usize,
}

impl Allocation {
    pub fn new(idx: usize, size: usize) -> Self {
        Self {
            idx,
            address: None,
            size,
        }
    }
}

/// Unallocated requests for every size in `size_sequence(n)`.
pub fn requests(n: usize) -> Vec<Allocation> {
    size_sequence(n)
        .into_iter()
        .enumerate()
        .map(|(idx, size)| Allocation::new(idx, size))
        .collect()
}

/// A workload step that the heap refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadError {
    /// Index of the failing request.
    pub idx: usize,
    /// The heap's error.
    pub source: HeapError,
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request {} failed: {}", self.idx, self.source)
    }
}

impl Error for WorkloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Allocate every request that is not already live, in order.
///
/// Stops at the first refusal; requests allocated before it stay live.
pub fn allocate_all(heap: &mut Heap, allocations: &mut [Allocation]) -> Result<(), WorkloadError> {
    for alloc in allocations.iter_mut().filter(|a| a.address.is_none()) {
        let address = heap.allocate(alloc.size).map_err(|source| WorkloadError {
            idx: alloc.idx,
            source,
        })?;
        alloc.address = Some(address);
    }
    Ok(())
}

/// Free every live request, in order.
///
/// Stops at the first refusal; requests freed before it are marked dead.
pub fn release_all(heap: &mut Heap, allocations: &mut [Allocation]) -> Result<(), WorkloadError> {
    for alloc in allocations.iter_mut() {
        let Some(address) = alloc.address else {
            continue;
        };
        heap.free(address, alloc.size).map_err(|source| WorkloadError {
            idx: alloc.idx,
            source,
        })?;
        alloc.address = None;
    }
    Ok(())
}
