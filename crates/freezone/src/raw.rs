//! Low-level word access into arena storage.
//!
//! Every header read and write in the crate goes through [`read_word`] and
//! [`write_word`]. Both assert that the whole word lies inside the arena, so
//! a corrupted free list panics at the access instead of silently reading
//! or clobbering bytes it does not own.

/// Width of one header word in bytes.
pub(crate) const WORD: usize = std::mem::size_of::<u64>();

fn assert_in_bounds(len: usize, offset: usize) {
    assert!(
        offset.checked_add(WORD).is_some_and(|end| end <= len),
        "header word at offset {offset} outside arena of {len} bytes",
    );
}

/// Read the little-endian `u64` stored at `offset`.
///
/// # Panics
///
/// Panics if `offset + WORD` exceeds `bytes.len()`.
pub(crate) fn read_word(bytes: &[u8], offset: usize) -> u64 {
    assert_in_bounds(bytes.len(), offset);
    let mut word = [0u8; WORD];
    word.copy_from_slice(&bytes[offset..offset + WORD]);
    u64::from_le_bytes(word)
}

/// Store `value` as a little-endian `u64` at `offset`.
///
/// # Panics
///
/// Panics if `offset + WORD` exceeds `bytes.len()`.
pub(crate) fn write_word(bytes: &mut [u8], offset: usize, value: u64) {
    assert_in_bounds(bytes.len(), offset);
    bytes[offset..offset + WORD].copy_from_slice(&value.to_le_bytes());
}
