//! The circular, address-ordered free list and the allocation engine.
//!
//! [`FreeList`] holds only the head address; every other link lives in the
//! [`FreeBlockHeader`]s written inside the arena. Walking from the head
//! visits free blocks in strictly ascending address order and wraps from the
//! highest block back to the head.
//!
//! The three mutating operations are:
//!
//! - [`FreeList::allocate`]: first-fit search, then either unlink an exact
//!   match or split an oversized block and keep its high remainder.
//! - [`FreeList::insert`]: splice a released span in address order.
//! - [`FreeList::coalesce_from`]: one pass merging address-adjacent blocks,
//!   run after every insert.

use crate::arena::HeapArena;
use crate::error::HeapError;
use crate::handle::Address;
use crate::header::{FreeBlockHeader, HEADER_FOOTPRINT};

/// A block accepted by the first-fit scan.
struct Fit {
    block: Address,
    /// The node whose `next` is `block` (equal to `block` for a sole node).
    prev: Address,
    header: FreeBlockHeader,
}

/// Head reference of the in-arena free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FreeList {
    head: Option<Address>,
}

impl FreeList {
    /// A list with no free blocks.
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self { head: None }
    }

    /// A list whose only block spans the whole arena.
    pub(crate) fn spanning(arena: &mut HeapArena) -> Self {
        let head = Address(0);
        arena.set_header(
            head,
            FreeBlockHeader {
                size: arena.capacity(),
                next: head,
            },
        );
        Self { head: Some(head) }
    }

    /// A list over headers already written in the arena.
    #[cfg(test)]
    pub(crate) fn from_head(head: Address) -> Self {
        Self { head: Some(head) }
    }

    /// The lowest-addressed free block, if any.
    pub(crate) fn head(&self) -> Option<Address> {
        self.head
    }

    /// Whether a block of `size` bytes can serve a request of `real` bytes.
    ///
    /// The block must match exactly or leave a remainder large enough to
    /// carry its own header. Anything in between is skipped.
    fn accepts(size: usize, real: usize) -> bool {
        size == real || size.checked_sub(real).is_some_and(|slack| slack >= HEADER_FOOTPRINT)
    }

    /// The node linking back to `head`.
    fn tail(arena: &HeapArena, head: Address) -> Address {
        let mut cur = head;
        loop {
            let next = arena.header(cur).next;
            if next == head {
                return cur;
            }
            cur = next;
        }
    }

    /// Scan once around the circle from `head` for the first acceptable block.
    fn first_fit(arena: &HeapArena, head: Address, real: usize) -> Option<Fit> {
        // `None` stands for the tail, resolved only if the head itself fits.
        let mut prev = None;
        let mut cur = head;
        loop {
            let header = arena.header(cur);
            if Self::accepts(header.size, real) {
                let prev = prev.unwrap_or_else(|| Self::tail(arena, head));
                return Some(Fit {
                    block: cur,
                    prev,
                    header,
                });
            }
            if header.next == head {
                return None;
            }
            prev = Some(cur);
            cur = header.next;
        }
    }

    /// Carve `real` bytes out of the first block that can serve them.
    ///
    /// `real` must already be rounded to at least [`HEADER_FOOTPRINT`].
    /// Returns the start of the carved span, or `None` if no block qualifies.
    pub(crate) fn allocate(&mut self, arena: &mut HeapArena, real: usize) -> Option<Address> {
        debug_assert!(real >= HEADER_FOOTPRINT);
        let head = self.head?;
        let Fit {
            block,
            prev,
            header,
        } = Self::first_fit(arena, head, real)?;

        if header.size == real {
            self.unlink(arena, block, prev, header.next);
        } else {
            // Split: the caller gets the low part, the remainder takes the
            // block's place in the chain.
            let rest = block.add(real);
            let next = if header.next == block {
                rest
            } else {
                header.next
            };
            arena.set_header(
                rest,
                FreeBlockHeader {
                    size: header.size - real,
                    next,
                },
            );
            if prev != block {
                arena.set_next(prev, rest);
            }
            if head == block {
                self.head = Some(rest);
            }
        }
        Some(block)
    }

    fn unlink(&mut self, arena: &mut HeapArena, block: Address, prev: Address, next: Address) {
        if next == block {
            self.head = None;
            return;
        }
        arena.set_next(prev, next);
        if self.head == Some(block) {
            self.head = Some(next);
        }
    }

    /// Find the nodes a span starting at `at` must be spliced between.
    ///
    /// Returns `(prev, next)`. When `at` is below the head, `prev` is the
    /// tail and `next` the head. Otherwise `next` is the first node above
    /// `at`, or the head if the span goes after the tail.
    fn neighbours(arena: &HeapArena, head: Address, at: Address) -> (Address, Address) {
        if at < head {
            return (Self::tail(arena, head), head);
        }
        let mut prev = head;
        loop {
            let next = arena.header(prev).next;
            if next == head || next > at {
                return (prev, next);
            }
            prev = next;
        }
    }

    /// Return `[at, at + size)` to the list, then coalesce from the head.
    ///
    /// `size` must already be rounded to at least [`HEADER_FOOTPRINT`] and
    /// the span must lie inside the arena. A span overlapping an existing
    /// free block is rejected with `InvalidArgument` and the list is left
    /// untouched.
    pub(crate) fn insert(
        &mut self,
        arena: &mut HeapArena,
        at: Address,
        size: usize,
    ) -> Result<(), HeapError> {
        debug_assert!(size >= HEADER_FOOTPRINT);
        debug_assert!(arena.contains_range(at, size));

        let Some(head) = self.head else {
            arena.set_header(at, FreeBlockHeader { size, next: at });
            self.head = Some(at);
            return Ok(());
        };

        // A sole node needs no special case: it is both head and tail, so
        // the span lands on whichever side of it its address falls.
        let (prev, next) = Self::neighbours(arena, head, at);
        if prev <= at && prev.add(arena.header(prev).size) > at {
            return Err(HeapError::invalid(format!(
                "span {at}+{size} overlaps free block at {prev}"
            )));
        }
        if next > at && at.add(size) > next {
            return Err(HeapError::invalid(format!(
                "span {at}+{size} overlaps free block at {next}"
            )));
        }

        arena.set_header(at, FreeBlockHeader { size, next });
        arena.set_next(prev, at);
        let head = head.min(at);
        self.head = Some(head);
        self.coalesce_from(arena, head);
        Ok(())
    }

    /// Merge address-adjacent blocks in one pass around the circle.
    ///
    /// Each node is compared with its successor; on a match the successor is
    /// absorbed and the same node is compared again, so a run of any length
    /// collapses in one visit. The pass stops once the walk reaches `start`
    /// again. Requires the list to be address-sorted.
    pub(crate) fn coalesce_from(&mut self, arena: &mut HeapArena, start: Address) {
        let mut cur = start;
        loop {
            let header = arena.header(cur);
            let closing = header.next == start;
            if closing && cur == start {
                break;
            }
            if cur.add(header.size) == header.next {
                let absorbed = arena.header(header.next);
                arena.set_header(
                    cur,
                    FreeBlockHeader {
                        size: header.size + absorbed.size,
                        next: absorbed.next,
                    },
                );
                if self.head == Some(header.next) {
                    self.head = Some(cur);
                }
                if closing {
                    break;
                }
                continue;
            }
            if closing {
                break;
            }
            cur = header.next;
        }
    }
}
