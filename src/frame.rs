use crate::hw_def::MAX_RESPONSE_LEN;
use crate::integrity::{checksum, parse_triplet};

use heapless::String;

/// Longest string the device reports: 16 triplets of 2 characters each
pub const MAX_STRING_LEN: usize = MAX_RESPONSE_LEN / 3 * 2;

/// Bytes read back for one command, checksum bytes still embedded
#[derive(Clone, Copy)]
pub struct RawFrame {
    buf: [u8; MAX_RESPONSE_LEN],
    len: usize,
}

impl RawFrame {
    pub(crate) fn with_len(len: usize) -> Self {
        assert!(len <= MAX_RESPONSE_LEN);
        Self { buf: [0; MAX_RESPONSE_LEN], len }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// The bytes as read from the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Commands without a response produce an empty frame
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl core::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RawFrame({:02X?})", self.as_bytes())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RawFrame({=[u8]:X})", self.as_bytes())
    }
}

/// Accept a frame only if every triplet carries a matching checksum.
///
/// A trailing partial triplet fails validation as well.
pub fn validate(frame: &[u8]) -> Option<&[u8]> {
    if frame.len() % 3 != 0 {
        return None;
    }
    frame
        .chunks_exact(3)
        .all(|t| checksum(t[0], t[1]) == t[2])
        .then_some(frame)
}

/// Data words of a frame, `None` for each triplet whose checksum fails
pub fn triplets(frame: &[u8]) -> impl Iterator<Item = Option<u16>> + '_ {
    frame.chunks_exact(3).map(|t| parse_triplet(t[0], t[1], t[2]))
}

/// Data words of a frame that already passed [`validate`]
pub(crate) fn words<const N: usize>(frame: &[u8]) -> [u16; N] {
    let mut words = [0u16; N];
    for (word, t) in words.iter_mut().zip(frame.chunks_exact(3)) {
        *word = u16::from_be_bytes([t[0], t[1]]);
    }
    words
}

/// Device string with checksum bytes and NUL padding removed
pub(crate) fn decode_string(frame: &[u8]) -> String<MAX_STRING_LEN> {
    let mut s = String::new();
    for byte in frame.chunks_exact(3).flat_map(|t| [t[0], t[1]]) {
        if byte == 0 {
            continue;
        }
        // capacity is enough for a full response; only non-ASCII is replaced
        let c = if byte.is_ascii() { byte as char } else { '?' };
        let _ = s.push(c);
    }
    s
}
