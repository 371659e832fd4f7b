//! Structural audit of a heap.
//!
//! [`audit`] walks the free list once and checks every invariant the
//! allocator maintains between calls. With a live-allocation table it also
//! checks live blocks against free blocks and the byte conservation law.

use std::error::Error;
use std::fmt;

use crate::arena::HeapArena;
use crate::free_list::FreeList;
use crate::handle::Address;
use crate::header::{round_to_minimum, HEADER_FOOTPRINT};
use crate::iter::FreeSpan;
use crate::live::LiveAllocations;

/// A broken allocator invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A block extends past the end of the arena.
    OutOfBounds {
        /// Start of the offending block.
        address: Address,
        /// Its size.
        size: usize,
        /// Arena capacity.
        capacity: usize,
    },
    /// A free block is smaller than a header.
    Undersized {
        /// Start of the offending block.
        address: Address,
        /// Its size.
        size: usize,
    },
    /// The walk from the head went backwards before closing the circle.
    Unsorted {
        /// The block whose `next` link is out of order.
        prev: Address,
        /// Where that link points.
        next: Address,
    },
    /// Two free blocks overlap.
    FreeOverlap {
        /// Lower block.
        first: Address,
        /// Higher block.
        second: Address,
    },
    /// Two free blocks touch and should have been coalesced.
    Adjacent {
        /// Lower block.
        first: Address,
        /// Higher block.
        second: Address,
    },
    /// A live allocation overlaps a free block or another live allocation.
    LiveOverlap {
        /// The live allocation.
        live: Address,
        /// The block it overlaps.
        other: Address,
    },
    /// Free bytes plus live bytes do not add up to the capacity.
    Conservation {
        /// Sum of free block sizes.
        free: usize,
        /// Sum of live allocation footprints.
        live: usize,
        /// Arena capacity.
        capacity: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                address,
                size,
                capacity,
            } => write!(
                f,
                "block {address}+{size} exceeds arena of {capacity} bytes"
            ),
            Self::Undersized { address, size } => write!(
                f,
                "free block {address} has {size} bytes, below the {HEADER_FOOTPRINT}-byte header"
            ),
            Self::Unsorted { prev, next } => {
                write!(f, "free block {prev} links backwards to {next}")
            }
            Self::FreeOverlap { first, second } => {
                write!(f, "free blocks {first} and {second} overlap")
            }
            Self::Adjacent { first, second } => {
                write!(f, "free blocks {first} and {second} are adjacent")
            }
            Self::LiveOverlap { live, other } => {
                write!(f, "live allocation {live} overlaps block {other}")
            }
            Self::Conservation {
                free,
                live,
                capacity,
            } => write!(
                f,
                "{free} free + {live} live bytes != capacity {capacity}"
            ),
        }
    }
}

impl Error for InvariantViolation {}

/// Walk the free list and return its blocks, checking list invariants.
fn free_spans(arena: &HeapArena, list: &FreeList) -> Result<Vec<FreeSpan>, InvariantViolation> {
    let capacity = arena.capacity();
    let mut spans = Vec::new();
    let Some(head) = list.head() else {
        return Ok(spans);
    };

    let mut cur = head;
    loop {
        if !arena.contains_range(cur, HEADER_FOOTPRINT) {
            return Err(InvariantViolation::OutOfBounds {
                address: cur,
                size: HEADER_FOOTPRINT,
                capacity,
            });
        }
        let header = arena.header(cur);
        if header.size < HEADER_FOOTPRINT {
            return Err(InvariantViolation::Undersized {
                address: cur,
                size: header.size,
            });
        }
        if !arena.contains_range(cur, header.size) {
            return Err(InvariantViolation::OutOfBounds {
                address: cur,
                size: header.size,
                capacity,
            });
        }
        spans.push(FreeSpan {
            address: cur,
            size: header.size,
        });

        let next = header.next;
        if next == head {
            return Ok(spans);
        }
        // Strict ascent also bounds the walk: a cycle that skips the head
        // must step backwards somewhere.
        if next <= cur {
            return Err(InvariantViolation::Unsorted { prev: cur, next });
        }
        let end = cur.add(header.size);
        if end > next {
            return Err(InvariantViolation::FreeOverlap {
                first: cur,
                second: next,
            });
        }
        if end == next {
            return Err(InvariantViolation::Adjacent {
                first: cur,
                second: next,
            });
        }
        cur = next;
    }
}

fn check_live(
    capacity: usize,
    spans: &[FreeSpan],
    live: &LiveAllocations,
) -> Result<(), InvariantViolation> {
    let mut ranges: Vec<(Address, usize)> = live
        .iter()
        .map(|(address, size)| (address, round_to_minimum(size)))
        .collect();
    ranges.sort_unstable();

    for (i, &(address, span)) in ranges.iter().enumerate() {
        let end = address.add(span);
        if end.0 > capacity {
            return Err(InvariantViolation::OutOfBounds {
                address,
                size: span,
                capacity,
            });
        }
        if let Some(&(other, _)) = ranges.get(i + 1) {
            if end > other {
                return Err(InvariantViolation::LiveOverlap {
                    live: address,
                    other,
                });
            }
        }
        // Free blocks are sorted, so only the ones either side of `address`
        // can intersect it.
        let idx = spans.partition_point(|s| s.address < address);
        if let Some(after) = spans.get(idx) {
            if after.address < end {
                return Err(InvariantViolation::LiveOverlap {
                    live: address,
                    other: after.address,
                });
            }
        }
        if let Some(before) = idx.checked_sub(1).and_then(|i| spans.get(i)) {
            if before.end() > address {
                return Err(InvariantViolation::LiveOverlap {
                    live: address,
                    other: before.address,
                });
            }
        }
    }

    let free: usize = spans.iter().map(|s| s.size).sum();
    let live_bytes = live.footprint();
    if free + live_bytes != capacity {
        return Err(InvariantViolation::Conservation {
            free,
            live: live_bytes,
            capacity,
        });
    }
    Ok(())
}

/// Check every heap invariant.
///
/// Without a live table only the free list itself can be audited.
pub(crate) fn audit(
    arena: &HeapArena,
    list: &FreeList,
    live: Option<&LiveAllocations>,
) -> Result<(), InvariantViolation> {
    let spans = free_spans(arena, list)?;
    match live {
        Some(live) => check_live(arena.capacity(), &spans, live),
        None => Ok(()),
    }
}
