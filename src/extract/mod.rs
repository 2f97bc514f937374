//! Extract Module
//!
//! Packs a bit stream into 16-bit words that sort like the stream itself.
//!
//! ## Word Format
//! ```text
//!   15                              1   0
//!  ┌──────────────────────────────────┬───┐
//!  │ 15 content bits, zero padded     │ t │   t = 1: more words follow
//!  └──────────────────────────────────┴───┘   t = 0: last word
//! ```
//!
//! A packed string is a normalized stream (its last bit is 1) cut into
//! 15-bit chunks. Because the final content bit is a 1, zero padding is
//! unambiguous, and comparing words as `u16` gives the same order as
//! comparing the streams bit by bit with a prefix sorting first. Packed
//! strings can therefore be merged and searched without decoding.
//!
//! Every word, the last one included, carries exactly 15 content bits and
//! the tag; there is no variant that spends the tag bit on a 16th content bit.

use std::cmp::Ordering;

use crate::bits::BitStream;
use crate::codec::IntCodec;
use crate::error::{Result, SeqError};

/// Content bits carried by one packed word
pub const CHUNK_BITS: u32 = 15;

/// Tag bit marking a word that is followed by more words
const MORE: u16 = 1;

/// An owned packed string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedString(Vec<u16>);

impl PackedString {
    /// Wrap words that already form one packed string
    pub fn from_words(words: Vec<u16>) -> Result<Self> {
        match string_len(&words) {
            Some(len) if len == words.len() => Ok(Self(words)),
            _ => Err(SeqError::CorruptCode(
                "words do not form exactly one packed string".to_string(),
            )),
        }
    }

    pub fn as_words(&self) -> &[u16] {
        &self.0
    }

    pub fn into_words(self) -> Vec<u16> {
        self.0
    }

    /// Number of 16-bit words
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rebuild the (normalized) bit stream
    pub fn unpack(&self) -> Result<BitStream> {
        unpack(&self.0)
    }
}

impl PartialOrd for PackedString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackedString {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_packed(&self.0, &other.0)
    }
}

/// Whether `word` ends a packed string
#[inline]
pub fn is_terminal(word: u16) -> bool {
    word & MORE == 0
}

/// Normalize `bits` and pack all of it, leaving the stream empty
pub fn pack(bits: &mut BitStream) -> Result<PackedString> {
    bits.normalize();
    let mut remaining = bits.len();

    let mut words = Vec::new();
    words.try_reserve_exact((remaining / CHUNK_BITS as u64) as usize + 1)?;

    while remaining > CHUNK_BITS as u64 {
        let chunk = bits.pop_bits(CHUNK_BITS)? as u16;
        words.push((chunk << 1) | MORE);
        remaining -= CHUNK_BITS as u64;
    }
    let rest = remaining as u32;
    let chunk = (bits.pop_bits(rest)? << (CHUNK_BITS - rest)) as u16;
    words.push(chunk << 1);

    Ok(PackedString(words))
}

/// Encode `values` with `codec` and pack the result
pub fn pack_values<C: IntCodec + ?Sized>(codec: &C, values: &[u64]) -> Result<PackedString> {
    let mut bits = BitStream::new();
    codec.encode_all(&mut bits, values)?;
    pack(&mut bits)
}

/// Rebuild the normalized stream from the packed string at the start of `words`
pub fn unpack(words: &[u16]) -> Result<BitStream> {
    let mut bits = BitStream::with_capacity(words.len() / 4 + 1)?;
    for &word in words {
        bits.push_bits((word >> 1) as u64, CHUNK_BITS)?;
        if is_terminal(word) {
            bits.normalize();
            return Ok(bits);
        }
    }
    Err(SeqError::CorruptCode(
        "packed string has no terminal word".to_string(),
    ))
}

/// Words in the packed string starting at `words[0]`, terminal included
pub fn string_len(words: &[u16]) -> Option<usize> {
    words.iter().position(|&w| is_terminal(w)).map(|i| i + 1)
}

/// Order two packed strings without decoding them
pub fn compare_packed(a: &[u16], b: &[u16]) -> Ordering {
    for (&x, &y) in a.iter().zip(b.iter()) {
        match x.cmp(&y) {
            Ordering::Equal if is_terminal(x) => return Ordering::Equal,
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}
