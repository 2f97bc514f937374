//! Bits Module
//!
//! Bit-level queue that everything else is built on.
//!
//! ## Responsibilities
//! - Append up to 64 bits at a time at the tail
//! - Consume or inspect bits at the head, across word boundaries
//! - Normalize so that a non-empty stream ends in a 1 bit
//!
//! ## Layout
//! ```text
//!   head                                   tail
//!   ┌──────────┬──────────┬─────┬──────────┐
//!   │ word (k) │ word (64)│ ... │ word (j) │   per-word valid-bit count
//!   └──────────┴──────────┴─────┴──────────┘
//!   valid bits are right-aligned; the oldest bit is the highest valid one
//! ```

mod stream;

pub use stream::{BitStream, Words};

use crate::error::Result;

/// Anything bits can be consumed from, most significant first
pub trait BitSource {
    /// Consume `n` (0..=64) bits and return them right-aligned
    fn pop_bits(&mut self, n: u32) -> Result<u64>;
}

/// Anything bits can be appended to
pub trait BitSink {
    /// Append the low `n` (0..=64) bits of `value`
    fn push_bits(&mut self, value: u64, n: u32) -> Result<()>;
}

/// Mask with the low `n` bits set (`n` up to 64)
#[inline]
pub(crate) fn mask(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Shift left, yielding 0 instead of overflowing for `n >= 64`
#[inline]
pub(crate) fn shl(value: u64, n: u32) -> u64 {
    if n >= 64 {
        0
    } else {
        value << n
    }
}

/// Number of significant bits in `value` (0 for 0)
#[inline]
pub fn bit_length(value: u64) -> u32 {
    64 - value.leading_zeros()
}
