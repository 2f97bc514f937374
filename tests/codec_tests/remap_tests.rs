//! Tests for RemappedCodec

use seqstore::bits::BitStream;
use seqstore::codec::{IntCodec, RemappedCodec, TableCodec};
use seqstore::SeqError;

fn inner() -> TableCodec {
    TableCodec::canonical(&[(0, 2), (3, 4), (5, 8)]).unwrap()
}

#[test]
fn test_frequent_value_gets_short_code() {
    // 20 is frequent: swap it with 0
    let mut forward: Vec<u64> = (0..21).collect();
    forward.swap(0, 20);
    let codec = RemappedCodec::new(inner(), forward).unwrap();

    assert_eq!(codec.threshold(), 21);
    assert_eq!(codec.encoded_len(20).unwrap(), 2);
    assert_eq!(codec.encoded_len(0).unwrap(), 8);
    // above the threshold values pass through
    assert_eq!(codec.encoded_len(30).unwrap(), 8);
}

#[test]
fn test_round_trip() {
    let mut forward: Vec<u64> = (0..8).collect();
    forward.reverse();
    let codec = RemappedCodec::new(inner(), forward).unwrap();

    let values = [7, 0, 3, 36, 8, 7, 7, 1];
    let mut bits = BitStream::new();
    codec.encode_all(&mut bits, &values).unwrap();
    assert_eq!(codec.decode_n(&mut bits, values.len()).unwrap(), values);
    assert!(bits.is_empty());
}

#[test]
fn test_out_of_range_after_mapping() {
    let codec = RemappedCodec::new(inner(), vec![1, 0]).unwrap();
    let mut bits = BitStream::new();
    assert!(matches!(
        codec.encode(&mut bits, 40),
        Err(SeqError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_rejects_non_permutation() {
    assert!(matches!(
        RemappedCodec::new(inner(), vec![0, 0, 1]),
        Err(SeqError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        RemappedCodec::new(inner(), vec![0, 5]),
        Err(SeqError::InvalidConfiguration(_))
    ));
}
