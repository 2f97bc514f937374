//! BitStream implementation
//!
//! Growable queue of bits backed by a word array plus a per-word count.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SeqError};

use super::{mask, shl, BitSink, BitSource};

/// Growable queue of bits: append at the tail, consume at the head
#[derive(Debug, Clone, Default)]
pub struct BitStream {
    /// Word storage; valid bits are right-aligned in each word
    words: Vec<u64>,
    /// Valid-bit count of each word (0..=64)
    lens: Vec<u8>,
    /// Index of the first word still holding unconsumed bits
    head: usize,
}

impl BitStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with room for `words` words
    pub fn with_capacity(words: usize) -> Result<Self> {
        let mut stream = Self::new();
        stream.words.try_reserve_exact(words)?;
        stream.lens.try_reserve_exact(words)?;
        Ok(stream)
    }

    /// Build a stream holding `bytes`, first byte first
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut stream = Self::with_capacity(bytes.len() / 8 + 1)?;
        for chunk in bytes.chunks(8) {
            let value = chunk.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
            stream.push_bits(value, chunk.len() as u32 * 8)?;
        }
        Ok(stream)
    }

    /// Copy the stream out as bytes without consuming it.
    /// A trailing partial byte is padded with zeros on the right.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity((self.len() as usize + 7) / 8);
        let mut acc: u64 = 0;
        let mut acc_bits: u32 = 0;
        for (value, n) in self.words() {
            let mut remaining = n;
            while remaining > 0 {
                let take = remaining.min(8 - acc_bits);
                let piece = (value >> (remaining - take)) & mask(take);
                acc = (acc << take) | piece;
                acc_bits += take;
                remaining -= take;
                if acc_bits == 8 {
                    out.put_u8(acc as u8);
                    acc = 0;
                    acc_bits = 0;
                }
            }
        }
        if acc_bits > 0 {
            out.put_u8((acc << (8 - acc_bits)) as u8);
        }
        out.freeze()
    }

    // =========================================================================
    // Tail
    // =========================================================================

    /// Append the low `n` bits of `value` (0 <= n <= 64)
    ///
    /// Fills the tail word in place when it has room, otherwise starts a new
    /// tail word. On allocation failure the existing content is untouched.
    pub fn push_bits(&mut self, value: u64, n: u32) -> Result<()> {
        if n > 64 {
            return Err(SeqError::InvariantViolated(format!(
                "push of {} bits exceeds a word",
                n
            )));
        }
        if n == 0 {
            return Ok(());
        }
        let value = value & mask(n);

        if self.words.len() > self.head {
            let last = self.words.len() - 1;
            let used = self.lens[last] as u32;
            if used + n <= 64 {
                self.words[last] = shl(self.words[last], n) | value;
                self.lens[last] = (used + n) as u8;
                return Ok(());
            }
        }

        if self.words.len() == self.words.capacity() || self.lens.len() == self.lens.capacity() {
            self.grow()?;
        }
        self.words.push(value);
        self.lens.push(n as u8);
        Ok(())
    }

    /// Append every bit of `other` without consuming it
    pub fn append(&mut self, other: &BitStream) -> Result<()> {
        for (value, n) in other.words() {
            self.push_bits(value, n)?;
        }
        Ok(())
    }

    /// Make room for one more tail word. Consumed head words are reclaimed
    /// first; the arrays only grow (by ~1.25x + 2) when live words fill them.
    fn grow(&mut self) -> Result<()> {
        if self.head > 0 {
            self.words.drain(..self.head);
            self.lens.drain(..self.head);
            self.head = 0;
            if self.words.len() < self.words.capacity() && self.lens.len() < self.lens.capacity() {
                return Ok(());
            }
        }
        let capacity = self.words.capacity();
        let target = capacity + capacity / 4 + 2;
        self.words.try_reserve_exact(target - self.words.len())?;
        self.lens.try_reserve_exact(target - self.lens.len())?;
        Ok(())
    }

    // =========================================================================
    // Head
    // =========================================================================

    /// Inspect the next `n` bits (0 <= n <= 64) without consuming them
    pub fn peek_bits(&self, n: u32) -> Result<u64> {
        let (value, missing) = self.peek_inner(n)?;
        if missing > 0 {
            return Err(SeqError::InvariantViolated(format!(
                "peek of {} bits from a stream holding {}",
                n,
                n - missing
            )));
        }
        Ok(value)
    }

    /// Like `peek_bits`, but a stream shorter than `n` is padded with zeros
    pub fn peek_bits_padded(&self, n: u32) -> Result<u64> {
        let (value, missing) = self.peek_inner(n)?;
        Ok(shl(value, missing))
    }

    /// Consume the next `n` bits (0 <= n <= 64)
    pub fn pop_bits(&mut self, n: u32) -> Result<u64> {
        let value = self.peek_bits(n)?;
        self.consume(n);
        Ok(value)
    }

    /// Returns the available prefix of the next `n` bits and how many were missing
    fn peek_inner(&self, n: u32) -> Result<(u64, u32)> {
        if n > 64 {
            return Err(SeqError::InvariantViolated(format!(
                "read of {} bits exceeds a word",
                n
            )));
        }
        let mut acc = 0u64;
        let mut need = n;
        let mut idx = self.head;
        while need > 0 && idx < self.words.len() {
            let avail = self.lens[idx] as u32;
            if avail <= need {
                acc = shl(acc, avail) | self.words[idx];
                need -= avail;
            } else {
                acc = shl(acc, need) | (self.words[idx] >> (avail - need));
                need = 0;
            }
            idx += 1;
        }
        Ok((acc, need))
    }

    /// Drop `n` bits from the head; the caller has checked they exist
    fn consume(&mut self, n: u32) {
        let mut need = n;
        while need > 0 && self.head < self.words.len() {
            let idx = self.head;
            let avail = self.lens[idx] as u32;
            if avail <= need {
                need -= avail;
                self.head += 1;
            } else {
                let rest = avail - need;
                self.words[idx] &= mask(rest);
                self.lens[idx] = rest as u8;
                need = 0;
            }
        }
        if self.head == self.words.len() {
            self.clear();
        }
    }

    // =========================================================================
    // Whole-stream operations
    // =========================================================================

    /// Number of unconsumed bits
    pub fn len(&self) -> u64 {
        self.lens[self.head..].iter().map(|&l| l as u64).sum()
    }

    /// Whether no bits remain
    pub fn is_empty(&self) -> bool {
        self.lens[self.head..].iter().all(|&l| l == 0)
    }

    /// Drop every bit, keeping the allocation
    pub fn clear(&mut self) {
        self.words.clear();
        self.lens.clear();
        self.head = 0;
    }

    /// Drop trailing zero bits so a non-empty stream ends in a 1 bit
    pub fn normalize(&mut self) {
        while self.words.len() > self.head {
            match self.words.last() {
                Some(&0) => {
                    self.words.pop();
                    self.lens.pop();
                }
                _ => break,
            }
        }
        if self.words.len() == self.head {
            self.clear();
            return;
        }
        let last = self.words.len() - 1;
        let zeros = self.words[last].trailing_zeros();
        self.words[last] >>= zeros;
        self.lens[last] -= zeros as u8;
    }

    /// Words currently allocated for storage, live or not
    pub fn allocated_words(&self) -> usize {
        self.words.capacity()
    }

    /// Iterate the unconsumed bits as `(value, bit_count)` pieces, head first
    pub fn words(&self) -> Words<'_> {
        Words {
            words: &self.words[self.head..],
            lens: &self.lens[self.head..],
            pos: 0,
        }
    }
}

impl PartialEq for BitStream {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut left = self.clone();
        let mut right = other.clone();
        while !left.is_empty() {
            let n = left.len().min(64) as u32;
            match (left.pop_bits(n), right.pop_bits(n)) {
                (Ok(a), Ok(b)) if a == b => {}
                _ => return false,
            }
        }
        true
    }
}

impl Eq for BitStream {}

impl BitSource for BitStream {
    fn pop_bits(&mut self, n: u32) -> Result<u64> {
        BitStream::pop_bits(self, n)
    }
}

impl BitSink for BitStream {
    fn push_bits(&mut self, value: u64, n: u32) -> Result<()> {
        BitStream::push_bits(self, value, n)
    }
}

/// Iterator over the pieces of a [`BitStream`]
pub struct Words<'a> {
    words: &'a [u64],
    lens: &'a [u8],
    pos: usize,
}

impl Iterator for Words<'_> {
    type Item = (u64, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.words.len() {
            let idx = self.pos;
            self.pos += 1;
            if self.lens[idx] > 0 {
                return Some((self.words[idx], self.lens[idx] as u32));
            }
        }
        None
    }
}
