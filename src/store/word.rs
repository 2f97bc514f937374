//! Ring word
//!
//! One 64-bit slot of the ring: 63 payload bits plus the boundary flag.

/// Payload bits per ring word
pub const PAYLOAD_BITS: u32 = 63;

const BOUNDARY: u64 = 1 << PAYLOAD_BITS;

/// A ring slot. The boundary flag is set on the last word of every block.
///
/// Payload writes go through [`RingWord::set_payload`], which never touches
/// the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingWord(u64);

impl RingWord {
    /// Empty payload, boundary set: a block of one word
    pub fn boundary_only() -> Self {
        RingWord(BOUNDARY)
    }

    #[inline]
    pub fn payload(self) -> u64 {
        self.0 & !BOUNDARY
    }

    #[inline]
    pub fn set_payload(&mut self, payload: u64) {
        self.0 = (self.0 & BOUNDARY) | (payload & !BOUNDARY);
    }

    #[inline]
    pub fn is_boundary(self) -> bool {
        self.0 & BOUNDARY != 0
    }

    #[inline]
    pub fn set_boundary(&mut self, boundary: bool) {
        if boundary {
            self.0 |= BOUNDARY;
        } else {
            self.0 &= !BOUNDARY;
        }
    }
}
