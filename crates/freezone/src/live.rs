//! Shadow table of live allocations.
//!
//! Allocated blocks carry no in-place metadata, so `free` would otherwise
//! have to trust the size it is given. [`LiveAllocations`] records the size
//! requested for every live address and lets the heap reject a free whose
//! address or size does not match.

use indexmap::IndexMap;

use crate::error::HeapError;
use crate::handle::Address;
use crate::header::round_to_minimum;

/// Requested sizes of live allocations, keyed by start address.
#[derive(Clone, Debug, Default)]
pub struct LiveAllocations {
    sizes: IndexMap<Address, usize>,
}

impl LiveAllocations {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh allocation of `size` requested bytes at `address`.
    pub fn record(&mut self, address: Address, size: usize) {
        let previous = self.sizes.insert(address, size);
        debug_assert!(previous.is_none(), "address {address} allocated twice");
    }

    /// Requested size of the allocation starting at `address`.
    pub fn get(&self, address: Address) -> Option<usize> {
        self.sizes.get(&address).copied()
    }

    /// Check that `address` is live and was allocated with `size` bytes.
    pub fn verify(&self, address: Address, size: usize) -> Result<(), HeapError> {
        let recorded = self
            .get(address)
            .ok_or(HeapError::UnknownAllocation { address })?;
        if recorded != size {
            return Err(HeapError::SizeMismatch {
                address,
                recorded,
                supplied: size,
            });
        }
        Ok(())
    }

    /// Forget the allocation at `address`.
    pub fn remove(&mut self, address: Address) -> Option<usize> {
        self.sizes.swap_remove(&address)
    }

    /// Number of live allocations.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether no allocation is live.
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Arena bytes held by live allocations (sizes rounded to the minimum).
    pub fn footprint(&self) -> usize {
        self.sizes.values().map(|&size| round_to_minimum(size)).sum()
    }

    /// Iterate over `(address, requested size)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, usize)> + '_ {
        self.sizes.iter().map(|(&address, &size)| (address, size))
    }
}
