//! Tests for the record header code
//!
//! These tests verify:
//! - Sentinel values for absent and empty records
//! - Chunk layout (continuation vs terminal chunks)
//! - Width accounting used by the store

use seqstore::bits::BitStream;
use seqstore::codec::{HeaderCode, RecordHeader};
use seqstore::SeqError;

// =============================================================================
// RecordHeader Tests
// =============================================================================

#[test]
fn test_raw_mapping() {
    assert_eq!(RecordHeader::Absent.raw(), 0);
    assert_eq!(RecordHeader::Empty.raw(), 1);
    assert_eq!(RecordHeader::Bits(8).raw(), 9);

    assert_eq!(RecordHeader::from_raw(0), RecordHeader::Absent);
    assert_eq!(RecordHeader::from_raw(1), RecordHeader::Empty);
    assert_eq!(RecordHeader::from_raw(9), RecordHeader::Bits(8));

    assert_eq!(RecordHeader::present(0), RecordHeader::Empty);
    assert_eq!(RecordHeader::present(3), RecordHeader::Bits(3));
    assert_eq!(RecordHeader::Bits(3).payload_bits(), 3);
    assert_eq!(RecordHeader::Empty.payload_bits(), 0);
    assert!(RecordHeader::Absent.is_absent());
    assert!(!RecordHeader::Empty.is_absent());
}

// =============================================================================
// HeaderCode Tests
// =============================================================================

#[test]
fn test_single_chunk_sentinels() {
    let code = HeaderCode::new(6).unwrap();
    assert_eq!(code.chunk_bits(), 7);
    assert_eq!(code.mult(), 64);

    let mut bits = BitStream::new();
    code.encode_header(&mut bits, RecordHeader::Absent).unwrap();
    code.encode_header(&mut bits, RecordHeader::Empty).unwrap();
    assert_eq!(bits.len(), 14);
    assert_eq!(bits.peek_bits(14).unwrap(), 0b0000000_0000001);

    assert_eq!(code.decode_header(&mut bits).unwrap(), RecordHeader::Absent);
    assert_eq!(code.decode_header(&mut bits).unwrap(), RecordHeader::Empty);
}

#[test]
fn test_multi_chunk_layout() {
    // lenlen 4: raw 0x123 is three digits 1, 2, 3
    let code = HeaderCode::new(4).unwrap();
    let mut bits = BitStream::new();
    code.encode(&mut bits, 0x123).unwrap();

    assert_eq!(bits.len(), 15);
    assert_eq!(code.encoded_len(0x123), 15);
    assert_eq!(bits.pop_bits(5).unwrap(), 0b1_0001);
    assert_eq!(bits.pop_bits(5).unwrap(), 0b1_0010);
    assert_eq!(bits.pop_bits(5).unwrap(), 0b0_0011);
}

#[test]
fn test_round_trip_widths() {
    for lenlen in [1, 4, 6, 8, 10, 16] {
        let code = HeaderCode::new(lenlen).unwrap();
        for raw in [0u64, 1, 2, 63, 64, 65, 1000, 1 << 20, u64::MAX >> 1, u64::MAX] {
            let mut bits = BitStream::new();
            code.encode(&mut bits, raw).unwrap();
            assert_eq!(bits.len(), code.encoded_len(raw), "lenlen {} raw {}", lenlen, raw);
            assert_eq!(code.decode(&mut bits).unwrap(), raw, "lenlen {} raw {}", lenlen, raw);
            assert!(bits.is_empty());
        }
    }
}

#[test]
fn test_header_len_grows_with_payload() {
    let code = HeaderCode::new(6).unwrap();
    assert_eq!(code.header_len(RecordHeader::Absent), 7);
    assert_eq!(code.header_len(RecordHeader::Bits(62)), 7); // raw 63
    assert_eq!(code.header_len(RecordHeader::Bits(63)), 14); // raw 64
}

#[test]
fn test_invalid_digit_width() {
    assert!(matches!(HeaderCode::new(0), Err(SeqError::InvalidConfiguration(_))));
    assert!(HeaderCode::new(17).is_err());
}

#[test]
fn test_runaway_header() {
    let code = HeaderCode::new(8).unwrap();
    let mut bits = BitStream::new();
    // nine continuation chunks
    for _ in 0..9 {
        bits.push_bits(0x1FF, 9).unwrap();
    }
    assert!(matches!(code.decode(&mut bits), Err(SeqError::CorruptHeader(_))));
}

#[test]
fn test_truncated_header() {
    let code = HeaderCode::new(8).unwrap();
    let mut bits = BitStream::new();
    bits.push_bits(0x1FF, 9).unwrap(); // continuation with nothing after it
    assert!(code.decode(&mut bits).is_err());
}
