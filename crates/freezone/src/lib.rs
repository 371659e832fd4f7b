//! First-fit free-list allocation over a single fixed-size arena.
//!
//! A [`Heap`] reserves one contiguous byte range up front and hands out
//! sub-ranges of it by [`Address`]. No general-purpose allocator is involved
//! after initialization: free space is tracked entirely by headers written
//! inside the free blocks themselves.
//!
//! # Architecture
//!
//! ```text
//! Heap (handle, owns everything below)
//! ├── HeapArena           Vec<u8> reserved once, never grown
//! ├── FreeList            head address of a circular, address-sorted chain
//! │   └── FreeBlockHeader [size: u64][next: u64] at the start of each free block
//! └── LiveAllocations     address → requested size (checked mode only)
//! ```
//!
//! # Algorithm
//!
//! - **Allocate:** scan the free list once from the lowest address. Take the
//!   first block that matches the request exactly, or that is at least one
//!   header larger (the remainder stays free). Blocks in between are skipped.
//! - **Free:** splice the block back in address order, then merge every run
//!   of touching free blocks in one pass.
//!
//! Requests smaller than [`HEADER_FOOTPRINT`] are rounded up to it so every
//! allocated block can later be turned back into a free block.
//!
//! # Safety
//!
//! The crate contains no `unsafe` code. Headers are read and written through
//! bounds-asserting helpers in a single private module.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod arena;
pub mod check;
pub mod config;
pub mod error;
mod free_list;
pub mod handle;
pub mod header;
pub mod heap;
pub mod iter;
mod live;
mod raw;
pub mod stats;

// Public re-exports for the primary API surface.
pub use check::InvariantViolation;
pub use config::{HeapConfig, SizeTracking};
pub use error::HeapError;
pub use handle::Address;
pub use header::{round_to_minimum, HEADER_FOOTPRINT};
pub use heap::Heap;
pub use iter::{FreeBlocks, FreeSpan};
pub use stats::HeapStats;
