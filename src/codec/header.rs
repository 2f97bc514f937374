//! Record header code
//!
//! Headers carry a length in `lenlen`-bit digits, most significant first.
//! Each digit travels in a chunk of `lenlen + 1` bits:
//!
//! ```text
//!   chunk >= mult (= 2^lenlen)   continuation: digit = chunk - mult
//!   chunk <  mult                terminal:     digit = chunk
//! ```
//!
//! Raw values 0 and 1 are the absent and present-empty sentinels; a record
//! of `n >= 1` payload bits has raw value `n + 1`.

use crate::bits::{bit_length, mask, BitSink, BitSource};
use crate::error::{Result, SeqError};

/// Decoded meaning of a record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordHeader {
    /// No record under this key
    Absent,
    /// Record present with no payload
    Empty,
    /// Record present with this many payload bits (at least 1)
    Bits(u64),
}

impl RecordHeader {
    /// Header for a present record of `bits` payload bits
    pub fn present(bits: u64) -> Self {
        if bits == 0 {
            RecordHeader::Empty
        } else {
            RecordHeader::Bits(bits)
        }
    }

    pub fn raw(self) -> u64 {
        match self {
            RecordHeader::Absent => 0,
            RecordHeader::Empty => 1,
            RecordHeader::Bits(n) => n + 1,
        }
    }

    pub fn from_raw(raw: u64) -> Self {
        match raw {
            0 => RecordHeader::Absent,
            1 => RecordHeader::Empty,
            n => RecordHeader::Bits(n - 1),
        }
    }

    /// Payload length in bits (0 for absent and empty records)
    pub fn payload_bits(self) -> u64 {
        match self {
            RecordHeader::Bits(n) => n,
            _ => 0,
        }
    }

    pub fn is_absent(self) -> bool {
        self == RecordHeader::Absent
    }
}

/// Chunked self-delimiting header code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCode {
    lenlen: u32,
}

impl HeaderCode {
    pub fn new(lenlen: u32) -> Result<Self> {
        if lenlen == 0 || lenlen > 16 {
            return Err(SeqError::InvalidConfiguration(format!(
                "header digit width must be 1..=16, got {}",
                lenlen
            )));
        }
        Ok(Self { lenlen })
    }

    /// Bits per chunk
    pub fn chunk_bits(&self) -> u32 {
        self.lenlen + 1
    }

    /// Continuation threshold
    pub fn mult(&self) -> u64 {
        1u64 << self.lenlen
    }

    fn digits(&self, raw: u64) -> u32 {
        bit_length(raw).div_ceil(self.lenlen).max(1)
    }

    /// Width of the code for `raw`
    pub fn encoded_len(&self, raw: u64) -> u64 {
        (self.digits(raw) * self.chunk_bits()) as u64
    }

    /// Width of the code for a header
    pub fn header_len(&self, header: RecordHeader) -> u64 {
        self.encoded_len(header.raw())
    }

    pub fn encode<S: BitSink + ?Sized>(&self, sink: &mut S, raw: u64) -> Result<()> {
        let digits = self.digits(raw);
        for i in (0..digits).rev() {
            let digit = (raw >> (i * self.lenlen)) & mask(self.lenlen);
            let chunk = if i > 0 { self.mult() | digit } else { digit };
            sink.push_bits(chunk, self.chunk_bits())?;
        }
        Ok(())
    }

    pub fn decode<S: BitSource + ?Sized>(&self, source: &mut S) -> Result<u64> {
        let max_digits = 64u32.div_ceil(self.lenlen);
        let mut raw = 0u64;
        for _ in 0..max_digits {
            let chunk = source.pop_bits(self.chunk_bits())?;
            raw = (raw << self.lenlen) | (chunk & mask(self.lenlen));
            if chunk < self.mult() {
                return Ok(raw);
            }
        }
        Err(SeqError::CorruptHeader(format!(
            "header runs past {} chunks",
            max_digits
        )))
    }

    pub fn encode_header<S: BitSink + ?Sized>(&self, sink: &mut S, header: RecordHeader) -> Result<()> {
        self.encode(sink, header.raw())
    }

    pub fn decode_header<S: BitSource + ?Sized>(&self, source: &mut S) -> Result<RecordHeader> {
        self.decode(source).map(RecordHeader::from_raw)
    }
}
