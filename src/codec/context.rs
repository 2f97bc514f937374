//! Context (delta) codec
//!
//! Codes each value as the gap from the previous one, so sorted sequences
//! (document ids, positions) cost only their gaps.

use crate::bits::BitStream;
use crate::error::{Result, SeqError};

use super::IntCodec;

/// Delta coder holding the running value of one sequence
#[derive(Debug)]
pub struct ContextCodec<'a, C: IntCodec + ?Sized> {
    codec: &'a C,
    last: u64,
}

impl<'a, C: IntCodec + ?Sized> ContextCodec<'a, C> {
    /// Start a sequence at 0
    pub fn new(codec: &'a C) -> Self {
        Self { codec, last: 0 }
    }

    /// Append `value`, which must not be below the previous one
    pub fn encode(&mut self, bits: &mut BitStream, value: u64) -> Result<()> {
        if value < self.last {
            return Err(SeqError::NotMonotonic {
                last: self.last,
                value,
            });
        }
        self.codec.encode(bits, value - self.last)?;
        self.last = value;
        Ok(())
    }

    /// Consume the next value of the sequence
    pub fn decode(&mut self, bits: &mut BitStream) -> Result<u64> {
        let delta = self.codec.decode(bits)?;
        self.last = self.last.checked_add(delta).ok_or_else(|| {
            SeqError::CorruptCode(format!("delta {} overflows after {}", delta, self.last))
        })?;
        Ok(self.last)
    }

    /// Most recent value coded or decoded
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Start a new sequence
    pub fn reset(&mut self) {
        self.last = 0;
    }
}
