//! Tests for record growth, block fusing and the growth limit
//!
//! These tests verify:
//! - Records grow far past one word by fusing blocks
//! - Neighbouring records survive every fuse, including across the ring end
//! - A refused fuse leaves the store untouched
//! - Shrinking keeps fused blocks and returns bits

use seqstore::bits::BitStream;
use seqstore::config::KeyDensity;
use seqstore::SeqError;

use crate::common::init_tracing;
use crate::sequential_store;

// =============================================================================
// Helper Functions
// =============================================================================

fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
}

// =============================================================================
// Growth Tests
// =============================================================================

#[test]
fn test_grow_record_with_neighbors() {
    init_tracing();
    let mut store = sequential_store(4096, KeyDensity::One);
    assert_eq!(store.word_count(), 4097);

    for ident in 95..=110u64 {
        if ident == 100 {
            continue;
        }
        assert_eq!(store.insert_bytes(ident, &payload(3, ident as u8)).unwrap(), ident);
    }
    let key = store.insert_bytes(100, &payload(1, 0)).unwrap();
    assert_eq!(key, 100);

    let mut size = 8;
    while size <= 2048 {
        let data = payload(size, 1);
        store.update_bytes(key, &data).unwrap();
        assert_eq!(store.read_bytes(key).unwrap().unwrap().as_ref(), data.as_slice());

        for ident in (95..=110u64).filter(|&i| i != 100) {
            assert_eq!(
                store.read_bytes(ident).unwrap().unwrap().as_ref(),
                payload(3, ident as u8).as_slice(),
                "neighbor {} after growing to {} bytes",
                ident,
                size
            );
        }
        assert!(store.read(94).unwrap().is_none());
        assert!(store.read(111).unwrap().is_none());
        size *= 2;
    }

    assert!(store.fuses() > 0);
    let block = store.locate(key).unwrap().block;
    assert!(block.bits() >= 2048 * 8);
    assert_eq!(store.locate(111).unwrap().block, block);
    assert!(store.stats().fuse_percent <= 100);
}

#[test]
fn test_fuse_wraps_around_ring_end() {
    let mut store = sequential_store(4096, KeyDensity::One);
    let last = store.key_capacity() - 1;

    for ident in 0..3u64 {
        assert_eq!(store.insert_bytes(ident, &payload(2, ident as u8)).unwrap(), ident);
    }
    assert_eq!(store.insert_bytes(last, &payload(1, 9)).unwrap(), last);

    store.update_bytes(last, &payload(100, 9)).unwrap();

    let block = store.locate(last).unwrap().block;
    assert_eq!(block.start as u64, last);
    assert_eq!(store.locate(0).unwrap().block, block);
    assert_eq!(store.locate(2).unwrap().block, block);

    assert_eq!(store.read_bytes(last).unwrap().unwrap().as_ref(), payload(100, 9).as_slice());
    for ident in 0..3u64 {
        assert_eq!(
            store.read_bytes(ident).unwrap().unwrap().as_ref(),
            payload(2, ident as u8).as_slice()
        );
    }

    // shrinking keeps the fused block and the neighbours
    store.update_bytes(last, &payload(1, 9)).unwrap();
    assert_eq!(store.locate(0).unwrap().block, block);
    assert_eq!(store.read_bytes(1).unwrap().unwrap().as_ref(), payload(2, 1).as_slice());
}

#[test]
fn test_shrink_returns_bits_and_regrow_reuses_block() {
    let mut store = sequential_store(1024, KeyDensity::Two);
    let key = store.insert_bytes(50, &payload(1, 0)).unwrap();
    let neighbor = store.insert_bytes(51, &payload(4, 3)).unwrap();
    let small_free = store.free_bits();

    store.update_bytes(key, &payload(200, 0)).unwrap();
    let fuses = store.fuses();
    assert!(fuses > 0);
    assert!(store.free_bits() < small_free);

    store.update_bytes(key, &payload(1, 0)).unwrap();
    assert_eq!(store.free_bits(), small_free);
    assert_eq!(store.fuses(), fuses);

    store.update_bytes(key, &payload(200, 5)).unwrap();
    assert_eq!(store.fuses(), fuses, "space freed by the shrink is reused");
    assert_eq!(store.read_bytes(key).unwrap().unwrap().as_ref(), payload(200, 5).as_slice());
    assert_eq!(store.read_bytes(neighbor).unwrap().unwrap().as_ref(), payload(4, 3).as_slice());
}

#[test]
fn test_grow_in_small_steps() {
    let mut store = sequential_store(256, KeyDensity::Eight);
    let key = store.insert(3, &BitStream::new()).unwrap();
    let other = store.insert_bytes(4, b"keep").unwrap();

    let mut bits = BitStream::new();
    for i in 0..150u64 {
        bits.push_bits(i & 1, 1).unwrap();
        store.update(key, &bits).unwrap();
    }
    assert_eq!(store.read(key).unwrap().unwrap(), bits);
    assert_eq!(store.read_bytes(other).unwrap().unwrap().as_ref(), b"keep");
}

// =============================================================================
// Growth Limit Tests
// =============================================================================

#[test]
fn test_store_full_leaves_state_unchanged() {
    // 17 words; a block may not pass 5 words (315 bits)
    let mut store = sequential_store(64, KeyDensity::Four);
    assert_eq!(store.word_count(), 17);

    let key = store.insert_bytes(0, b"abc").unwrap();
    store.insert_bytes(4, b"next").unwrap();
    let free_bits = store.free_bits();
    let free_keys = store.free_keys();
    let block = store.locate(key).unwrap().block;

    let mut big = BitStream::new();
    for _ in 0..400 {
        big.push_bits(1, 1).unwrap();
    }
    assert!(matches!(store.update(key, &big), Err(SeqError::StoreFull(_))));

    assert_eq!(store.read_bytes(key).unwrap().unwrap().as_ref(), b"abc");
    assert_eq!(store.read_bytes(4).unwrap().unwrap().as_ref(), b"next");
    assert_eq!(store.free_bits(), free_bits);
    assert_eq!(store.free_keys(), free_keys);
    assert_eq!(store.fuses(), 0);
    assert_eq!(store.locate(key).unwrap().block, block);
}

#[test]
fn test_failed_insert_releases_key() {
    let mut store = sequential_store(64, KeyDensity::Four);
    let free_bits = store.free_bits();

    let mut big = BitStream::new();
    for _ in 0..7 {
        big.push_bits(u64::MAX, 64).unwrap();
    }
    assert!(matches!(store.insert(20, &big), Err(SeqError::StoreFull(_))));

    assert!(store.read(20).unwrap().is_none());
    assert_eq!(store.free_keys(), store.key_capacity());
    assert_eq!(store.free_bits(), free_bits);

    // the key is usable afterwards
    assert_eq!(store.insert_bytes(20, b"ok").unwrap(), 20);
}

#[test]
fn test_record_up_to_growth_limit() {
    let mut store = sequential_store(64, KeyDensity::Four);
    let key = store.insert(0, &BitStream::new()).unwrap();

    // 5 words hold 315 bits; 20 keys share them, 19 of them absent (7 bits each)
    let room = 315 - 19 * 7 - 14;
    let mut bits = BitStream::new();
    for _ in 0..room {
        bits.push_bits(1, 1).unwrap();
    }
    store.update(key, &bits).unwrap();
    assert_eq!(store.locate(key).unwrap().block.words, 5);
    assert_eq!(store.read(key).unwrap().unwrap(), bits);

    bits.push_bits(1, 1).unwrap();
    assert!(matches!(store.update(key, &bits), Err(SeqError::StoreFull(_))));
}
