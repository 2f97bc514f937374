//! Remapped codec
//!
//! Small values are permuted through a forward table before coding, so the
//! most frequent ones land on the shortest codes.

use crate::bits::BitStream;
use crate::error::{Result, SeqError};

use super::{IntCodec, TableCodec};

/// A [`TableCodec`] preceded by a permutation of `0..forward.len()`
#[derive(Debug, Clone)]
pub struct RemappedCodec {
    inner: TableCodec,
    forward: Vec<u64>,
    inverse: Vec<u64>,
}

impl RemappedCodec {
    /// `forward[v]` is the value actually coded for `v`; values at or above
    /// `forward.len()` are coded unchanged. `forward` must be a permutation.
    pub fn new(inner: TableCodec, forward: Vec<u64>) -> Result<Self> {
        let mut inverse = Vec::new();
        inverse.try_reserve_exact(forward.len())?;
        inverse.resize(forward.len(), u64::MAX);

        for (value, &mapped) in forward.iter().enumerate() {
            let slot = inverse.get_mut(mapped as usize).ok_or_else(|| {
                SeqError::InvalidConfiguration(format!(
                    "remap of {} to {} leaves the table range 0..{}",
                    value,
                    mapped,
                    forward.len()
                ))
            })?;
            if *slot != u64::MAX {
                return Err(SeqError::InvalidConfiguration(format!(
                    "remap target {} used twice",
                    mapped
                )));
            }
            *slot = value as u64;
        }

        Ok(Self {
            inner,
            forward,
            inverse,
        })
    }

    /// Values below this threshold go through the remap table
    pub fn threshold(&self) -> u64 {
        self.forward.len() as u64
    }

    fn map(&self, value: u64) -> u64 {
        self.forward.get(value as usize).copied().unwrap_or(value)
    }
}

impl IntCodec for RemappedCodec {
    fn encode(&self, bits: &mut BitStream, value: u64) -> Result<()> {
        self.inner.encode(bits, self.map(value))
    }

    fn decode(&self, bits: &mut BitStream) -> Result<u64> {
        let coded = self.inner.decode(bits)?;
        Ok(self.inverse.get(coded as usize).copied().unwrap_or(coded))
    }

    fn encoded_len(&self, value: u64) -> Result<u32> {
        self.inner.encoded_len(self.map(value))
    }
}
