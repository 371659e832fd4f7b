//! The reserved byte range a heap manages.
//!
//! A [`HeapArena`] is a single contiguous `Vec<u8>` reserved up front and
//! never grown. Free block headers live inside it; allocated bytes are
//! handed to callers through bounds-checked slices.

use crate::error::HeapError;
use crate::handle::Address;
use crate::header::FreeBlockHeader;

/// Contiguous backing storage for one heap.
pub struct HeapArena {
    /// Backing storage. Reserved to full capacity at creation.
    bytes: Vec<u8>,
}

impl HeapArena {
    /// Reserve and zero `capacity` bytes.
    ///
    /// Returns `Err(HeapError::OutOfMemory)` if the reservation fails; no
    /// memory is retained in that case.
    pub fn reserve(capacity: usize) -> Result<Self, HeapError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| HeapError::OutOfMemory {
                requested: capacity,
            })?;
        bytes.resize(capacity, 0);
        Ok(Self { bytes })
    }

    /// Total size of the arena in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Whether `[at, at + len)` lies entirely inside the arena.
    pub fn contains_range(&self, at: Address, len: usize) -> bool {
        at.0.checked_add(len)
            .is_some_and(|end| end <= self.bytes.len())
    }

    /// Decode the free block header stored at `at`.
    ///
    /// # Panics
    ///
    /// Panics if the header would extend past the end of the arena.
    pub(crate) fn header(&self, at: Address) -> FreeBlockHeader {
        FreeBlockHeader::read(&self.bytes, at)
    }

    /// Write a free block header at `at`.
    pub(crate) fn set_header(&mut self, at: Address, header: FreeBlockHeader) {
        header.write(&mut self.bytes, at);
    }

    /// Relink the free block at `at` to `next`, keeping its size.
    pub(crate) fn set_next(&mut self, at: Address, next: Address) {
        let size = self.header(at).size;
        self.set_header(at, FreeBlockHeader { size, next });
    }

    /// Shared view of `len` bytes starting at `at`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the arena.
    pub(crate) fn slice(&self, at: Address, len: usize) -> &[u8] {
        &self.bytes[at.0..at.0 + len]
    }

    /// Mutable view of `len` bytes starting at `at`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the arena.
    pub(crate) fn slice_mut(&mut self, at: Address, len: usize) -> &mut [u8] {
        &mut self.bytes[at.0..at.0 + len]
    }
}
