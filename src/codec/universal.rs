//! Universal length code
//!
//! Codes a value in exactly its bit length: the low `len - 1` bits followed
//! by a terminal 1 bit. The length is not stored, so the code must be the
//! only thing left in the stream when it is decoded.

use crate::bits::{bit_length, mask, BitStream};
use crate::error::{Result, SeqError};

/// Self-contained code for the final integer of a stream
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalCode;

impl UniversalCode {
    /// Append `value`; 0 costs no bits at all
    pub fn encode(bits: &mut BitStream, value: u64) -> Result<()> {
        let len = bit_length(value);
        if len == 0 {
            return Ok(());
        }
        bits.push_bits(value & mask(len - 1), len - 1)?;
        bits.push_bits(1, 1)
    }

    /// Consume the whole remaining stream as one value
    pub fn decode(bits: &mut BitStream) -> Result<u64> {
        let len = bits.len();
        if len == 0 {
            return Ok(0);
        }
        if len > 64 {
            return Err(SeqError::CorruptCode(format!(
                "universal code of {} bits exceeds a word",
                len
            )));
        }
        let len = len as u32;
        let code = bits.pop_bits(len)?;
        if code & 1 == 0 {
            return Err(SeqError::CorruptCode(
                "universal code lacks its terminal bit".to_string(),
            ));
        }
        Ok((code >> 1) | (1u64 << (len - 1)))
    }

    /// Width of the code for `value`
    pub fn encoded_len(value: u64) -> u32 {
        bit_length(value)
    }
}
