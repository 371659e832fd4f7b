//! Heap configuration parameters.

use crate::error::HeapError;
use crate::header::HEADER_FOOTPRINT;

/// How `free` verifies the size it is given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeTracking {
    /// Record every live allocation and reject frees whose address or size
    /// does not match a live record.
    #[default]
    Checked,
    /// Keep no record. The caller is trusted to pass back the size it
    /// allocated; a wrong size yields a consistent but wrong free list.
    Trusted,
}

/// Configuration for a [`Heap`](crate::Heap).
///
/// Validated at initialization; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Arena size in bytes. Must be at least [`HEADER_FOOTPRINT`].
    pub capacity: usize,

    /// Free-size verification policy. Default: [`SizeTracking::Checked`].
    pub size_tracking: SizeTracking,
}

impl HeapConfig {
    /// Default arena size: 1 MiB.
    pub const DEFAULT_CAPACITY: usize = 1 << 20;

    /// Create a config for an arena of `capacity` bytes with checked frees.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            size_tracking: SizeTracking::default(),
        }
    }

    /// Switch to trusted frees (no live-allocation table).
    pub fn trusted(mut self) -> Self {
        self.size_tracking = SizeTracking::Trusted;
        self
    }

    /// Check that the arena can hold at least one free block header.
    pub fn validate(&self) -> Result<(), HeapError> {
        if self.capacity < HEADER_FOOTPRINT {
            return Err(HeapError::invalid(format!(
                "capacity {} is below the {HEADER_FOOTPRINT}-byte header footprint",
                self.capacity
            )));
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
