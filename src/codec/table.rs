//! Direct segment codec
//!
//! Values are split into ascending segments; every value of a segment is
//! coded in the same number of bits. A lookup table indexed by the top
//! `bits` bits of the stream finds the segment in one step.

use crate::bits::BitStream;
use crate::error::{Result, SeqError};

use super::IntCodec;

/// Longest code a table codec may use (the lookup table has 2^bits slots)
pub const MAX_CODE_BITS: u32 = 20;

/// A contiguous value range sharing one code length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First value of the segment
    pub base: u64,
    /// Code of `base`
    pub code_base: u64,
    /// Code length in bits
    pub len: u32,
}

/// Immutable table-driven codec
#[derive(Debug, Clone)]
pub struct TableCodec {
    segments: Vec<Segment>,
    /// Longest code length
    bits: u32,
    /// Top-`bits` pattern → segment index + 1 (0 = no code starts that way)
    table: Vec<u16>,
    /// One past the largest encodable value
    limit: u64,
}

impl TableCodec {
    /// Build a codec from explicit segments
    ///
    /// Segments must have strictly ascending bases. Segment `i` covers
    /// `[base_i, base_{i+1})`; the last one covers every code left at its
    /// length. Overlapping code ranges are rejected.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() || segments.len() >= u16::MAX as usize {
            return Err(SeqError::InvalidConfiguration(format!(
                "codec needs between 1 and {} segments, got {}",
                u16::MAX - 1,
                segments.len()
            )));
        }

        let mut bits = 0;
        for (i, seg) in segments.iter().enumerate() {
            if seg.len == 0 || seg.len > MAX_CODE_BITS {
                return Err(SeqError::InvalidConfiguration(format!(
                    "segment {} has code length {} (allowed 1..={})",
                    i, seg.len, MAX_CODE_BITS
                )));
            }
            if i > 0 && seg.base <= segments[i - 1].base {
                return Err(SeqError::InvalidConfiguration(format!(
                    "segment {} base {} does not ascend",
                    i, seg.base
                )));
            }
            bits = bits.max(seg.len);
        }

        let mut table = Vec::new();
        table.try_reserve_exact(1usize << bits)?;
        table.resize(1usize << bits, 0u16);

        let mut limit = 0;
        for (i, seg) in segments.iter().enumerate() {
            let space = 1u64 << seg.len;
            let count = match segments.get(i + 1) {
                Some(next) => next.base - seg.base,
                None => space.saturating_sub(seg.code_base),
            };
            let end = seg.code_base.checked_add(count).unwrap_or(u64::MAX);
            if count == 0 || end > space {
                return Err(SeqError::InvalidConfiguration(format!(
                    "segment {} ({} values from code {}) does not fit in {} bits",
                    i, count, seg.code_base, seg.len
                )));
            }

            let shift = bits - seg.len;
            let first = (seg.code_base << shift) as usize;
            let last = (end << shift) as usize;
            for slot in &mut table[first..last] {
                if *slot != 0 {
                    return Err(SeqError::InvalidConfiguration(format!(
                        "segment {} overlaps segment {}",
                        i,
                        *slot - 1
                    )));
                }
                *slot = i as u16 + 1;
            }
            limit = seg.base.saturating_add(count);
        }

        Ok(Self {
            segments,
            bits,
            table,
            limit,
        })
    }

    /// Build a codec from `(base, len)` pairs, assigning canonical code bases
    ///
    /// Lengths must not decrease; codes are handed out in value order so the
    /// code order matches the value order.
    pub fn canonical(shape: &[(u64, u32)]) -> Result<Self> {
        let mut segments = Vec::new();
        segments.try_reserve_exact(shape.len())?;

        let mut code: u64 = 0;
        let mut prev_len = shape.first().map(|&(_, len)| len).unwrap_or(0);
        for (i, &(base, len)) in shape.iter().enumerate() {
            if len < prev_len || len == 0 || len > MAX_CODE_BITS {
                return Err(SeqError::InvalidConfiguration(format!(
                    "canonical segment {} has length {} after {}",
                    i, len, prev_len
                )));
            }
            code <<= len - prev_len;
            prev_len = len;
            segments.push(Segment {
                base,
                code_base: code,
                len,
            });
            if let Some(&(next_base, _)) = shape.get(i + 1) {
                if next_base <= base {
                    return Err(SeqError::InvalidConfiguration(format!(
                        "canonical segment {} base {} does not ascend",
                        i + 1,
                        next_base
                    )));
                }
                code += next_base - base;
            }
        }

        Self::from_segments(segments)
    }

    /// Longest code length (also the lookup width)
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// One past the largest encodable value
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn segment_for(&self, value: u64) -> Result<&Segment> {
        let idx = self.segments.partition_point(|s| s.base <= value);
        if idx == 0 || value >= self.limit {
            return Err(SeqError::ValueOutOfRange {
                value,
                limit: self.limit,
            });
        }
        Ok(&self.segments[idx - 1])
    }
}

impl IntCodec for TableCodec {
    fn encode(&self, bits: &mut BitStream, value: u64) -> Result<()> {
        let seg = self.segment_for(value)?;
        bits.push_bits(value - seg.base + seg.code_base, seg.len)
    }

    fn decode(&self, bits: &mut BitStream) -> Result<u64> {
        let pattern = bits.peek_bits_padded(self.bits)? as usize;
        let slot = self.table[pattern];
        if slot == 0 {
            return Err(SeqError::CorruptCode(format!(
                "no segment starts with pattern {:#x}",
                pattern
            )));
        }
        let seg = &self.segments[slot as usize - 1];
        let code = bits.pop_bits(seg.len).map_err(|_| {
            SeqError::CorruptCode(format!("stream ends inside a {}-bit code", seg.len))
        })?;
        Ok(code - seg.code_base + seg.base)
    }

    fn encoded_len(&self, value: u64) -> Result<u32> {
        Ok(self.segment_for(value)?.len)
    }
}
