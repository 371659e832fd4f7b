//! The heap handle.
//!
//! [`Heap`] owns one arena and its free list. It is the only public entry
//! point for allocation: every operation takes the handle explicitly, so
//! independent heaps never share state.
//!
//! The lifecycle is:
//! 1. `Heap::init()` / `Heap::initialize()`: reserve the arena, one free
//!    block spanning all of it
//! 2. `allocate()` / `free()`: first-fit carve, address-ordered release
//!    with coalescing
//! 3. `destroy()`: release the arena; every outstanding address is dead
//!
//! ```text
//! Heap
//! └── HeapState (present between initialize and destroy)
//!     ├── HeapArena         Vec<u8>, headers written in place
//!     ├── FreeList          head address only
//!     └── LiveAllocations   address → requested size (checked mode)
//! ```

use crate::arena::HeapArena;
use crate::check::{audit, InvariantViolation};
use crate::config::{HeapConfig, SizeTracking};
use crate::error::HeapError;
use crate::free_list::FreeList;
use crate::handle::Address;
use crate::header::round_to_minimum;
use crate::iter::FreeBlocks;
use crate::live::LiveAllocations;
use crate::stats::HeapStats;

/// Everything a heap holds while initialized.
struct HeapState {
    arena: HeapArena,
    free_list: FreeList,
    /// `None` under [`SizeTracking::Trusted`].
    live: Option<LiveAllocations>,
    config: HeapConfig,
}

/// A first-fit allocator over one fixed-size arena.
///
/// Allocated blocks are identified by [`Address`] and carry no in-place
/// metadata; free blocks carry a two-word header and form a circular list
/// sorted by address. See the crate docs for the algorithm.
///
/// A `Heap` starts uninitialized ([`Heap::new`]) or initialized
/// ([`Heap::init`], [`Heap::with_config`]). After [`Heap::destroy`] every
/// operation except [`Heap::initialize`] fails with
/// [`HeapError::NotInitialized`].
#[derive(Default)]
pub struct Heap {
    state: Option<HeapState>,
}

impl Heap {
    /// Create a handle that holds no arena yet.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Create a heap over a fresh `capacity`-byte arena with checked frees.
    pub fn init(capacity: usize) -> Result<Self, HeapError> {
        Self::with_config(HeapConfig::new(capacity))
    }

    /// Create a heap from an explicit configuration.
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        let mut heap = Self::new();
        heap.initialize(config)?;
        Ok(heap)
    }

    /// Reserve an arena for this handle.
    ///
    /// The whole arena becomes a single free block. Fails with
    /// `AlreadyInitialized` if the handle already holds an arena,
    /// `InvalidArgument` if the config does not validate, and
    /// `OutOfMemory` if the reservation fails. On failure the handle is
    /// unchanged.
    pub fn initialize(&mut self, config: HeapConfig) -> Result<(), HeapError> {
        if let Some(state) = &self.state {
            return Err(HeapError::AlreadyInitialized {
                capacity: state.arena.capacity(),
            });
        }
        config.validate()?;
        let mut arena = HeapArena::reserve(config.capacity)?;
        let free_list = FreeList::spanning(&mut arena);
        let live = match config.size_tracking {
            SizeTracking::Checked => Some(LiveAllocations::new()),
            SizeTracking::Trusted => None,
        };
        self.state = Some(HeapState {
            arena,
            free_list,
            live,
            config,
        });
        Ok(())
    }

    /// Release the arena. All addresses handed out so far become invalid.
    pub fn destroy(&mut self) -> Result<(), HeapError> {
        self.state.take().ok_or(HeapError::NotInitialized)?;
        Ok(())
    }

    /// Whether the handle currently holds an arena.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Arena size in bytes, if initialized.
    pub fn capacity(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.arena.capacity())
    }

    /// The configuration the arena was created with, if initialized.
    pub fn config(&self) -> Option<&HeapConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    fn state(&self) -> Result<&HeapState, HeapError> {
        self.state.as_ref().ok_or(HeapError::NotInitialized)
    }

    fn state_mut(&mut self) -> Result<&mut HeapState, HeapError> {
        self.state.as_mut().ok_or(HeapError::NotInitialized)
    }

    /// Allocate `size` bytes from the first free block that can hold them.
    ///
    /// The block actually carved is `max(size, HEADER_FOOTPRINT)` bytes so
    /// it can later be returned to the free list. Fails with
    /// `InvalidArgument` for a zero size and `NoSuitableBlock` when no free
    /// block matches exactly or leaves a remainder of at least one header.
    pub fn allocate(&mut self, size: usize) -> Result<Address, HeapError> {
        let HeapState {
            arena,
            free_list,
            live,
            ..
        } = self.state_mut()?;
        if size == 0 {
            return Err(HeapError::invalid("allocation size must be non-zero"));
        }
        let address = free_list
            .allocate(arena, round_to_minimum(size))
            .ok_or(HeapError::NoSuitableBlock { requested: size })?;
        if let Some(live) = live {
            live.record(address, size);
        }
        Ok(address)
    }

    /// Return the `size`-byte block at `address` to the free list.
    ///
    /// `size` must be the size passed to the `allocate` call that returned
    /// `address`. In checked mode a mismatch fails with `SizeMismatch` and
    /// an address that is not live (including a second free) fails with
    /// `UnknownAllocation`. In trusted mode only bounds and overlap with
    /// existing free blocks are checked.
    ///
    /// On success the block is spliced into the list in address order and
    /// merged with any free neighbours.
    pub fn free(&mut self, address: Address, size: usize) -> Result<(), HeapError> {
        let HeapState {
            arena,
            free_list,
            live,
            ..
        } = self.state_mut()?;
        let capacity = arena.capacity();
        if address.0 >= capacity {
            return Err(HeapError::invalid(format!(
                "address {address} outside arena of {capacity} bytes"
            )));
        }
        if size == 0 || size > capacity {
            return Err(HeapError::invalid(format!(
                "size {size} outside 1..={capacity}"
            )));
        }
        let span = round_to_minimum(size);
        if !arena.contains_range(address, span) {
            return Err(HeapError::invalid(format!(
                "block {address}+{span} runs past the end of the arena"
            )));
        }
        if let Some(live) = live.as_ref() {
            live.verify(address, size)?;
        }
        free_list.insert(arena, address, span)?;
        if let Some(live) = live {
            live.remove(address);
        }
        Ok(())
    }

    /// Iterate over the free blocks, lowest address first.
    ///
    /// Fails with `Empty` when every byte is allocated.
    pub fn free_blocks(&self) -> Result<FreeBlocks<'_>, HeapError> {
        let state = self.state()?;
        let head = state.free_list.head().ok_or(HeapError::Empty)?;
        Ok(FreeBlocks::new(&state.arena, head))
    }

    fn checked_range(
        state: &HeapState,
        address: Address,
        len: usize,
    ) -> Result<(), HeapError> {
        if !state.arena.contains_range(address, len) {
            return Err(HeapError::invalid(format!(
                "range {address}+{len} outside arena of {} bytes",
                state.arena.capacity()
            )));
        }
        if let Some(live) = &state.live {
            let size = live
                .get(address)
                .ok_or(HeapError::UnknownAllocation { address })?;
            if len > size {
                return Err(HeapError::invalid(format!(
                    "range {address}+{len} exceeds the {size}-byte allocation"
                )));
            }
        }
        Ok(())
    }

    /// Read `len` bytes of the allocation starting at `address`.
    ///
    /// In checked mode `address` must be the start of a live allocation and
    /// `len` must not exceed its size. In trusted mode only arena bounds are
    /// checked.
    pub fn bytes(&self, address: Address, len: usize) -> Result<&[u8], HeapError> {
        let state = self.state()?;
        Self::checked_range(state, address, len)?;
        Ok(state.arena.slice(address, len))
    }

    /// Mutable access to `len` bytes of the allocation at `address`.
    ///
    /// Same rules as [`Heap::bytes`].
    pub fn bytes_mut(&mut self, address: Address, len: usize) -> Result<&mut [u8], HeapError> {
        let state = self.state_mut()?;
        Self::checked_range(state, address, len)?;
        Ok(state.arena.slice_mut(address, len))
    }

    /// Summarise free space.
    pub fn stats(&self) -> Result<HeapStats, HeapError> {
        let state = self.state()?;
        let spans = state
            .free_list
            .head()
            .map(|head| FreeBlocks::new(&state.arena, head))
            .into_iter()
            .flatten();
        Ok(HeapStats::collect(
            state.arena.capacity(),
            spans,
            state.live.as_ref().map(LiveAllocations::len),
        ))
    }

    /// Audit every allocator invariant.
    ///
    /// An uninitialized heap is trivially consistent. In trusted mode only
    /// the free list itself can be checked.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match &self.state {
            Some(state) => audit(&state.arena, &state.free_list, state.live.as_ref()),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Heap");
        if let Some(state) = &self.state {
            s.field("capacity", &state.arena.capacity())
                .field("head", &state.free_list.head())
                .field("size_tracking", &state.config.size_tracking);
        }
        s.finish_non_exhaustive()
    }
}

#[cfg(debug_assertions)]
impl Drop for Heap {
    fn drop(&mut self) {
        let Some(live) = self.state.as_ref().and_then(|s| s.live.as_ref()) else {
            return;
        };
        if !live.is_empty() {
            eprintln!(
                "freezone: heap dropped with {} live allocation(s) holding {} bytes",
                live.len(),
                live.footprint(),
            );
        }
    }
}
