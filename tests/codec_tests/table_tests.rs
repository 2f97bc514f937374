//! Tests for TableCodec
//!
//! These tests verify:
//! - Canonical code construction and code widths
//! - Encode/decode of long sequences
//! - Range and corruption errors
//! - Rejection of malformed segment lists

use seqstore::bits::BitStream;
use seqstore::codec::{IntCodec, Segment, TableCodec, MAX_CODE_BITS};
use seqstore::SeqError;

use crate::common::init_tracing;

// =============================================================================
// Helper Functions
// =============================================================================

/// 0..3 in 2 bits, 3..5 in 4 bits, 5..37 in 8 bits
fn example_codec() -> TableCodec {
    TableCodec::canonical(&[(0, 2), (3, 4), (5, 8)]).unwrap()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_canonical_shape() {
    let codec = example_codec();

    assert_eq!(codec.bits(), 8);
    assert_eq!(codec.limit(), 37);
    assert_eq!(
        codec.segments(),
        &[
            Segment { base: 0, code_base: 0, len: 2 },
            Segment { base: 3, code_base: 12, len: 4 },
            Segment { base: 5, code_base: 224, len: 8 },
        ]
    );
}

#[test]
fn test_encoded_len() {
    let codec = example_codec();

    assert_eq!(codec.encoded_len(0).unwrap(), 2);
    assert_eq!(codec.encoded_len(2).unwrap(), 2);
    assert_eq!(codec.encoded_len(3).unwrap(), 4);
    assert_eq!(codec.encoded_len(4).unwrap(), 4);
    assert_eq!(codec.encoded_len(5).unwrap(), 8);
    assert_eq!(codec.encoded_len(36).unwrap(), 8);
}

#[test]
fn test_code_bits() {
    let codec = example_codec();
    let mut bits = BitStream::new();

    codec.encode(&mut bits, 1).unwrap();
    codec.encode(&mut bits, 3).unwrap();
    codec.encode(&mut bits, 36).unwrap();

    assert_eq!(bits.len(), 14);
    assert_eq!(bits.pop_bits(2).unwrap(), 0b01);
    assert_eq!(bits.pop_bits(4).unwrap(), 0b1100);
    assert_eq!(bits.pop_bits(8).unwrap(), 0b1111_1111);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_sequence_round_trip() {
    init_tracing();
    let codec = example_codec();
    let mut rng = fastrand::Rng::with_seed(3);
    let values: Vec<u64> = (0..2000).map(|_| rng.u64(0..37)).collect();

    let mut bits = BitStream::new();
    codec.encode_all(&mut bits, &values).unwrap();

    let expected: u64 = values
        .iter()
        .map(|&v| codec.encoded_len(v).unwrap() as u64)
        .sum();
    assert_eq!(bits.len(), expected);

    let decoded = codec.decode_n(&mut bits, values.len()).unwrap();
    assert_eq!(decoded, values);
    assert!(bits.is_empty());
}

#[test]
fn test_explicit_segments_with_gaps() {
    // 0..2 as 0x, 2..10 as 1xxx
    let codec = TableCodec::from_segments(vec![
        Segment { base: 0, code_base: 0, len: 2 },
        Segment { base: 2, code_base: 8, len: 4 },
    ])
    .unwrap();
    assert_eq!(codec.limit(), 10);

    let mut bits = BitStream::new();
    codec.encode_all(&mut bits, &[0, 1, 2, 9]).unwrap();
    assert_eq!(codec.decode_n(&mut bits, 4).unwrap(), vec![0, 1, 2, 9]);
}

#[test]
fn test_decode_at_end_of_short_stream() {
    // A 2-bit code at the very end must decode even though the lookup
    // peeks a full 8 bits
    let codec = example_codec();
    let mut bits = BitStream::new();
    codec.encode(&mut bits, 2).unwrap();

    assert_eq!(codec.decode(&mut bits).unwrap(), 2);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_encode_out_of_range() {
    let codec = example_codec();
    let mut bits = BitStream::new();

    let result = codec.encode(&mut bits, 37);
    assert!(matches!(
        result,
        Err(SeqError::ValueOutOfRange { value: 37, limit: 37 })
    ));
    assert!(bits.is_empty());
    assert!(codec.encoded_len(1000).is_err());
}

#[test]
fn test_encode_below_first_base() {
    let codec = TableCodec::canonical(&[(10, 3)]).unwrap();
    let mut bits = BitStream::new();

    assert!(matches!(
        codec.encode(&mut bits, 9),
        Err(SeqError::ValueOutOfRange { .. })
    ));
    codec.encode(&mut bits, 10).unwrap();
    codec.encode(&mut bits, 17).unwrap();
    assert_eq!(codec.decode_n(&mut bits, 2).unwrap(), vec![10, 17]);
}

#[test]
fn test_decode_unmapped_pattern() {
    // codes 01, 10, 11 are used; 00 is not
    let codec = TableCodec::from_segments(vec![Segment {
        base: 0,
        code_base: 1,
        len: 2,
    }])
    .unwrap();

    let mut bits = BitStream::new();
    bits.push_bits(0b00, 2).unwrap();
    assert!(matches!(codec.decode(&mut bits), Err(SeqError::CorruptCode(_))));
}

#[test]
fn test_decode_truncated_code() {
    let codec = example_codec();
    let mut bits = BitStream::new();
    bits.push_bits(0b111, 3).unwrap(); // prefix of an 8-bit code

    assert!(matches!(codec.decode(&mut bits), Err(SeqError::CorruptCode(_))));
}

#[test]
fn test_rejects_malformed_segments() {
    assert!(TableCodec::from_segments(vec![]).is_err());

    // code too long
    assert!(TableCodec::from_segments(vec![Segment {
        base: 0,
        code_base: 0,
        len: MAX_CODE_BITS + 1,
    }])
    .is_err());

    // bases not ascending
    assert!(TableCodec::from_segments(vec![
        Segment { base: 4, code_base: 0, len: 3 },
        Segment { base: 4, code_base: 4, len: 3 },
    ])
    .is_err());

    // second segment's codes collide with the first
    assert!(matches!(
        TableCodec::from_segments(vec![
            Segment { base: 0, code_base: 0, len: 2 },
            Segment { base: 3, code_base: 0, len: 4 },
        ]),
        Err(SeqError::InvalidConfiguration(_))
    ));

    // more values than codes
    assert!(TableCodec::from_segments(vec![
        Segment { base: 0, code_base: 0, len: 1 },
        Segment { base: 5, code_base: 1, len: 1 },
    ])
    .is_err());
}

#[test]
fn test_canonical_rejects_shrinking_lengths() {
    assert!(TableCodec::canonical(&[(0, 4), (3, 2)]).is_err());
    assert!(TableCodec::canonical(&[(0, 2), (0, 4)]).is_err());
}
