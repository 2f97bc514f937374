//! Codec Module
//!
//! Table-driven variable-length integer codes over a [`BitStream`].
//!
//! ## Flavors
//! - [`TableCodec`]: direct segment code, O(1) decode via peek + lookup
//! - [`RemappedCodec`]: small values permuted (e.g. by frequency rank) first
//! - [`ContextCodec`]: delta coding of non-decreasing sequences
//! - [`UniversalCode`]: self-contained length code, valid only as the last
//!   content of a stream
//! - [`HeaderCode`]: chunked self-delimiting code used for record headers
//!
//! ## Segment code
//! ```text
//!   value a, segment s with s.base <= a < next.base
//!   code  = a - s.base + s.code_base          (s.len bits)
//!
//!   decode: peek `bits` bits ─► table[pattern] ─► segment ─► pop s.len bits
//! ```

mod context;
mod header;
mod remap;
mod table;
mod universal;

pub use context::ContextCodec;
pub use header::{HeaderCode, RecordHeader};
pub use remap::RemappedCodec;
pub use table::{Segment, TableCodec, MAX_CODE_BITS};
pub use universal::UniversalCode;

use crate::bits::BitStream;
use crate::error::Result;

/// A stateless integer code over a bit stream
pub trait IntCodec {
    /// Append the code for `value`
    fn encode(&self, bits: &mut BitStream, value: u64) -> Result<()>;

    /// Consume one code from the head of `bits`
    fn decode(&self, bits: &mut BitStream) -> Result<u64>;

    /// Width in bits of the code for `value`
    fn encoded_len(&self, value: u64) -> Result<u32>;

    /// Append the codes for every value in order
    fn encode_all(&self, bits: &mut BitStream, values: &[u64]) -> Result<()> {
        for &value in values {
            self.encode(bits, value)?;
        }
        Ok(())
    }

    /// Consume `n` codes
    fn decode_n(&self, bits: &mut BitStream, n: usize) -> Result<Vec<u64>> {
        let mut out = Vec::new();
        out.try_reserve_exact(n)?;
        for _ in 0..n {
            out.push(self.decode(bits)?);
        }
        Ok(out)
    }
}
