//! Read-only traversal of the free list.

use std::iter::FusedIterator;

use crate::arena::HeapArena;
use crate::handle::Address;

/// One free block as seen by [`FreeBlocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeSpan {
    /// Start of the block.
    pub address: Address,
    /// Total bytes in the block, header included.
    pub size: usize,
}

impl FreeSpan {
    /// One past the last byte of the block.
    pub fn end(&self) -> Address {
        self.address.add(self.size)
    }
}

/// Lazy walk over every free block, lowest address first.
///
/// Visits each block exactly once and stops after one circuit. The walk
/// borrows the heap, so the list cannot change underneath it. Clone the
/// iterator (or ask the heap for a new one) to restart.
#[derive(Clone)]
pub struct FreeBlocks<'a> {
    arena: &'a HeapArena,
    head: Address,
    cursor: Option<Address>,
}

impl<'a> FreeBlocks<'a> {
    pub(crate) fn new(arena: &'a HeapArena, head: Address) -> Self {
        Self {
            arena,
            head,
            cursor: Some(head),
        }
    }
}

impl Iterator for FreeBlocks<'_> {
    type Item = FreeSpan;

    fn next(&mut self) -> Option<FreeSpan> {
        let address = self.cursor?;
        let header = self.arena.header(address);
        self.cursor = (header.next != self.head).then_some(header.next);
        Some(FreeSpan {
            address,
            size: header.size,
        })
    }
}

impl FusedIterator for FreeBlocks<'_> {}
