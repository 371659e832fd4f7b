//! Heap usage statistics.

use crate::iter::FreeSpan;

/// A point-in-time summary of a heap's free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
    /// Arena size in bytes.
    pub capacity: usize,
    /// Bytes held by free blocks.
    pub free_bytes: usize,
    /// Bytes handed out to callers (`capacity - free_bytes`).
    pub used_bytes: usize,
    /// Number of free blocks.
    pub free_blocks: usize,
    /// Size of the largest free block, or 0 when nothing is free.
    pub largest_free_block: usize,
    /// Number of live allocations, when the heap tracks them.
    pub live_allocations: Option<usize>,
}

impl HeapStats {
    pub(crate) fn collect(
        capacity: usize,
        spans: impl Iterator<Item = FreeSpan>,
        live_allocations: Option<usize>,
    ) -> Self {
        let (free_bytes, free_blocks, largest_free_block) =
            spans.fold((0, 0, 0), |(bytes, count, largest), span| {
                (bytes + span.size, count + 1, largest.max(span.size))
            });
        Self {
            capacity,
            free_bytes,
            used_bytes: capacity - free_bytes,
            free_blocks,
            largest_free_block,
            live_allocations,
        }
    }

    /// Share of free bytes outside the largest free block, in `[0, 1]`.
    ///
    /// 0 means all free space is one block; values near 1 mean free space
    /// is scattered across many small blocks.
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_block as f64 / self.free_bytes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Address;

    fn span(address: usize, size: usize) -> FreeSpan {
        FreeSpan {
            address: Address(address),
            size,
        }
    }

    #[test]
    fn collect_sums_free_blocks() {
        let stats = HeapStats::collect(
            1000,
            [span(0, 100), span(200, 300), span(600, 50)].into_iter(),
            Some(2),
        );
        assert_eq!(stats.free_bytes, 450);
        assert_eq!(stats.used_bytes, 550);
        assert_eq!(stats.free_blocks, 3);
        assert_eq!(stats.largest_free_block, 300);
        assert_eq!(stats.live_allocations, Some(2));
    }

    #[test]
    fn fragmentation_of_single_block_is_zero() {
        let stats = HeapStats::collect(1000, [span(0, 1000)].into_iter(), None);
        assert_eq!(stats.fragmentation(), 0.0);
    }

    #[test]
    fn fragmentation_of_full_heap_is_zero() {
        let stats = HeapStats::collect(1000, std::iter::empty(), Some(1));
        assert_eq!(stats.free_bytes, 0);
        assert_eq!(stats.fragmentation(), 0.0);
    }

    #[test]
    fn fragmentation_grows_with_scatter() {
        let stats = HeapStats::collect(
            1000,
            [span(0, 100), span(200, 100), span(400, 100), span(600, 100)].into_iter(),
            None,
        );
        assert!((stats.fragmentation() - 0.75).abs() < 1e-12);
    }
}
