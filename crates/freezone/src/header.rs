//! In-place free block headers.
//!
//! A header is written at the first byte of every free block.
//! It occupies two words: the block's total size (header included) followed
//! by the address of the next free block in the circular list. Allocated
//! blocks carry no header.

use crate::handle::Address;
use crate::raw::{read_word, write_word, WORD};

/// Bytes needed to store a free block header in place.
///
/// This is also the smallest block the allocator ever hands out or tracks:
/// anything smaller could not be turned back into a free block.
pub const HEADER_FOOTPRINT: usize = 2 * WORD;

/// Round a requested size up to the smallest trackable block.
pub fn round_to_minimum(size: usize) -> usize {
    size.max(HEADER_FOOTPRINT)
}

/// Metadata stored at the start of a free block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FreeBlockHeader {
    /// Total bytes spanned by the block, including this header.
    pub(crate) size: usize,
    /// The next free block in address order (wrapping back to the lowest).
    pub(crate) next: Address,
}

impl FreeBlockHeader {
    /// Decode the header stored at `at`.
    pub(crate) fn read(bytes: &[u8], at: Address) -> Self {
        Self {
            size: read_word(bytes, at.0) as usize,
            next: Address(read_word(bytes, at.0 + WORD) as usize),
        }
    }

    /// Encode this header at `at`.
    pub(crate) fn write(self, bytes: &mut [u8], at: Address) {
        write_word(bytes, at.0, self.size as u64);
        write_word(bytes, at.0 + WORD, self.next.0 as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_is_two_words() {
        assert_eq!(HEADER_FOOTPRINT, 16);
    }

    #[test]
    fn round_to_minimum_raises_small_sizes() {
        assert_eq!(round_to_minimum(1), HEADER_FOOTPRINT);
        assert_eq!(round_to_minimum(HEADER_FOOTPRINT), HEADER_FOOTPRINT);
        assert_eq!(round_to_minimum(100), 100);
    }

    #[test]
    fn header_survives_encode_at_offset() {
        let mut bytes = vec![0u8; 64];
        let header = FreeBlockHeader {
            size: 48,
            next: Address(0),
        };
        header.write(&mut bytes, Address(16));
        assert_eq!(FreeBlockHeader::read(&bytes, Address(16)), header);
        // Bytes outside the header are untouched.
        assert!(bytes[..16].iter().all(|&b| b == 0));
        assert!(bytes[32..].iter().all(|&b| b == 0));
    }
}
