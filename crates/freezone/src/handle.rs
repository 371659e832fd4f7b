//! Arena addresses.
//!
//! An [`Address`] is a byte offset from the start of the arena that issued
//! it. Offsets rather than raw pointers keep every access bounds-checkable
//! and make addresses comparable across runs, which is what the free list
//! ordering relies on.

use std::fmt;

/// Byte offset of a block within its arena.
///
/// `Address(0)` is the first byte of the arena. Addresses are only
/// meaningful for the [`Heap`](crate::Heap) that returned them and become
/// invalid once that heap is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub usize);

impl Address {
    /// The byte offset this address denotes.
    pub fn offset(self) -> usize {
        self.0
    }

    /// The address `len` bytes past this one.
    pub(crate) fn add(self, len: usize) -> Self {
        Self(self.0 + len)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<usize> for Address {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_advances_offset() {
        assert_eq!(Address(100).add(28), Address(128));
    }

    #[test]
    fn ordering_follows_offset() {
        assert!(Address(0) < Address(1));
        assert!(Address(4096) > Address(100));
    }

    #[test]
    fn display_shows_offset() {
        assert_eq!(Address(42).to_string(), "@42");
    }
}
