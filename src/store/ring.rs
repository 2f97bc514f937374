//! Circular record store
//!
//! Fixed ring of words holding self-delimiting records, one per K-key.
//!
//! ## Block layout
//! ```text
//!   block = words s..=e (boundary flag set only on e)
//!   ┌──────────────┬─────────────┬─────┬──────────────┬─────────┐
//!   │ hdr(k0) data │ hdr(k1) data│ ... │ hdr(kn) data │ padding │
//!   └──────────────┴─────────────┴─────┴──────────────┴─────────┘
//!   keys k0..kn are the keys whose home words are s..=e, in ring order
//! ```

use bytes::Bytes;

use crate::bits::{mask, shl, BitSink, BitSource, BitStream};
use crate::codec::{HeaderCode, RecordHeader};
use crate::config::StoreConfig;
use crate::error::{Result, SeqError};

use super::keys::{HashedProbe, KeyDeriver};
use super::stats::StoreStats;
use super::word::{RingWord, PAYLOAD_BITS};

/// Smallest ring built, before prime nudging
const MIN_WORDS: u64 = 8;

/// Word counts are moved off multiples of these to spread keys better
const SMALL_PRIMES: [u64; 4] = [2, 3, 5, 7];

/// A run of ring words between two boundary flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// First word
    pub start: usize,
    /// Length in words
    pub words: usize,
}

impl Block {
    /// Payload capacity in bits
    pub fn bits(&self) -> u64 {
        self.words as u64 * PAYLOAD_BITS as u64
    }
}

/// Where a key's record lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Enclosing block
    pub block: Block,
    /// Bit offset of the record header inside the block
    pub header_bit: u64,
    /// Position of the key among the block's keys
    pub ordinal: u64,
}

/// Ring buffer of variable-length records addressed by dense K-keys
pub struct CircularRecordStore {
    ring: Vec<RingWord>,
    keys_per_word: u64,
    key_capacity: u64,
    header: HeaderCode,
    max_block_words: usize,
    probe_limit: u32,
    deriver: Box<dyn KeyDeriver>,
    free_keys: u64,
    free_bits: u64,
    fuses: u64,
}

impl CircularRecordStore {
    /// Allocate a store with every key absent
    pub fn new(config: StoreConfig) -> Result<Self> {
        let fuse_limit = config.fuse_limit.validate()?;
        let keys_per_word = config.density.keys_per_word();
        let header = HeaderCode::new(config.density.header_lenlen())?;

        let absent_len = header.header_len(RecordHeader::Absent);
        if absent_len * keys_per_word > PAYLOAD_BITS as u64 {
            return Err(SeqError::InvalidConfiguration(format!(
                "{} absent headers of {} bits do not fit in a word",
                keys_per_word, absent_len
            )));
        }

        let mut word_count = config.key_capacity.div_ceil(keys_per_word).max(MIN_WORDS);
        while SMALL_PRIMES.iter().any(|p| word_count % p == 0) {
            word_count += 1;
        }
        let key_capacity = word_count * keys_per_word;

        let mut ring = Vec::new();
        ring.try_reserve_exact(word_count as usize)?;
        ring.resize(word_count as usize, RingWord::boundary_only());

        let total_bits = word_count * PAYLOAD_BITS as u64;
        tracing::debug!(
            word_count,
            keys_per_word,
            key_capacity,
            chunk_bits = header.chunk_bits(),
            "created record store"
        );

        Ok(Self {
            ring,
            keys_per_word,
            key_capacity,
            header,
            max_block_words: fuse_limit.max_block_words(word_count) as usize,
            probe_limit: config.probe_limit,
            deriver: Box::new(HashedProbe),
            free_keys: key_capacity,
            free_bits: total_bits - key_capacity * absent_len,
            fuses: 0,
        })
    }

    /// Replace the key derivation strategy used by `insert`
    pub fn with_deriver(mut self, deriver: impl KeyDeriver + 'static) -> Self {
        self.deriver = Box::new(deriver);
        self
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Payload of `key`; `None` if the key is absent
    ///
    /// The header records the exact payload length, so the bits come back
    /// as stored: nothing is appended on write or stripped on read, and
    /// trailing zero bits survive.
    pub fn read(&self, key: u64) -> Result<Option<BitStream>> {
        let loc = self.locate(key)?;
        let mut reader = BlockReader::new(self, loc.block, loc.header_bit);
        let header = self.header.decode_header(&mut reader)?;
        match header {
            RecordHeader::Absent => Ok(None),
            RecordHeader::Empty => Ok(Some(BitStream::new())),
            RecordHeader::Bits(n) => {
                let mut out = BitStream::with_capacity((n / 64) as usize + 1)?;
                let end = reader.pos + n;
                self.copy_out(loc.block, reader.pos, end, &mut out)?;
                Ok(Some(out))
            }
        }
    }

    /// Store `payload` under a fresh key derived from `ident`, returning the key
    pub fn insert(&mut self, ident: u64, payload: &BitStream) -> Result<u64> {
        if self.free_keys == 0 {
            return Err(SeqError::KeySpaceExhausted { attempts: 0 });
        }

        for attempt in 0..self.probe_limit {
            let key = self.deriver.derive(ident, attempt) % self.key_capacity;
            if !self.header_at(key)?.is_absent() {
                continue;
            }

            self.rewrite(key, RecordHeader::Empty, None, true)?;
            self.free_keys -= 1;
            if let Err(e) = self.update(key, payload) {
                self.rewrite(key, RecordHeader::Absent, None, false)?;
                self.free_keys += 1;
                return Err(e);
            }
            return Ok(key);
        }

        tracing::warn!(ident, attempts = self.probe_limit, "no free key found");
        Err(SeqError::KeySpaceExhausted {
            attempts: self.probe_limit,
        })
    }

    /// Replace the payload of a present key
    pub fn update(&mut self, key: u64, payload: &BitStream) -> Result<()> {
        let header = RecordHeader::present(payload.len());
        self.rewrite(key, header, Some(payload), false)?;
        Ok(())
    }

    /// Make a present key absent again
    pub fn delete(&mut self, key: u64) -> Result<()> {
        self.rewrite(key, RecordHeader::Absent, None, false)?;
        self.free_keys += 1;
        Ok(())
    }

    /// Advisory load figures; never mutates the store
    pub fn stats(&self) -> StoreStats {
        StoreStats::compute(
            self.fuses,
            self.ring.len() as u64,
            self.free_bits,
            self.total_bits(),
            self.free_keys,
            self.key_capacity,
        )
    }

    /// Find the block holding `key` and the offset of its header
    pub fn locate(&self, key: u64) -> Result<Location> {
        if key >= self.key_capacity {
            return Err(SeqError::KeyOutOfRange {
                key,
                capacity: self.key_capacity,
            });
        }
        let len = self.ring.len();
        let home = (key / self.keys_per_word) as usize;
        let block = self.block_of(home)?;
        let ordinal = ((home + len - block.start) % len) as u64 * self.keys_per_word
            + key % self.keys_per_word;

        let mut reader = BlockReader::new(self, block, 0);
        for _ in 0..ordinal {
            self.skip_record(&mut reader)?;
        }
        Ok(Location {
            block,
            header_bit: reader.pos,
            ordinal,
        })
    }

    // =========================================================================
    // Byte payloads
    // =========================================================================

    pub fn read_bytes(&self, key: u64) -> Result<Option<Bytes>> {
        Ok(self.read(key)?.map(|bits| bits.to_bytes()))
    }

    pub fn insert_bytes(&mut self, ident: u64, payload: &[u8]) -> Result<u64> {
        let bits = BitStream::from_bytes(payload)?;
        self.insert(ident, &bits)
    }

    pub fn update_bytes(&mut self, key: u64, payload: &[u8]) -> Result<()> {
        let bits = BitStream::from_bytes(payload)?;
        self.update(key, &bits)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn key_capacity(&self) -> u64 {
        self.key_capacity
    }

    pub fn word_count(&self) -> usize {
        self.ring.len()
    }

    pub fn keys_per_word(&self) -> u64 {
        self.keys_per_word
    }

    pub fn free_keys(&self) -> u64 {
        self.free_keys
    }

    pub fn free_bits(&self) -> u64 {
        self.free_bits
    }

    /// Number of block fuses performed so far
    pub fn fuses(&self) -> u64 {
        self.fuses
    }

    fn total_bits(&self) -> u64 {
        self.ring.len() as u64 * PAYLOAD_BITS as u64
    }

    // =========================================================================
    // Record rewriting
    // =========================================================================

    fn header_at(&self, key: u64) -> Result<RecordHeader> {
        let loc = self.locate(key)?;
        let mut reader = BlockReader::new(self, loc.block, loc.header_bit);
        self.header.decode_header(&mut reader)
    }

    /// Replace the record of `key` with `new_header` (+ `payload`), moving the
    /// rest of the block and fusing with following blocks as needed.
    /// Nothing is modified unless the new record fits.
    fn rewrite(
        &mut self,
        key: u64,
        new_header: RecordHeader,
        payload: Option<&BitStream>,
        allow_absent: bool,
    ) -> Result<RecordHeader> {
        let loc = self.locate(key)?;
        let mut reader = BlockReader::new(self, loc.block, loc.header_bit);
        let old_header = self.header.decode_header(&mut reader)?;
        if old_header.is_absent() && !allow_absent {
            return Err(SeqError::KeyNotFound(key));
        }

        let old_total = reader.pos - loc.header_bit + old_header.payload_bits();
        let new_total = self.header.header_len(new_header) + new_header.payload_bits();
        let record_end = loc.header_bit + old_total;
        if record_end > loc.block.bits() {
            return Err(SeqError::CorruptHeader(format!(
                "record of key {} runs past its block",
                key
            )));
        }

        if new_total == old_total {
            self.write_record(loc.block, loc.header_bit, new_header, payload, None)?;
            return Ok(old_header);
        }

        // Drain everything after the record into scratch
        let used_end = self.used_end(loc.block, record_end, loc.ordinal + 1)?;
        let mut scratch = BitStream::new();
        self.copy_out(loc.block, record_end, used_end, &mut scratch)?;
        let mut spare = loc.block.bits() - used_end;

        // Plan fuses until the new record fits
        let mut block = loc.block;
        let mut fused = 0u64;
        while new_total > old_total + spare {
            let next = self.next_block(block)?;
            if block.words + next.words > self.max_block_words || block.words + next.words > self.ring.len() {
                tracing::warn!(
                    key,
                    block_words = block.words,
                    next_words = next.words,
                    limit = self.max_block_words,
                    "fuse refused: block would exceed growth limit"
                );
                return Err(SeqError::StoreFull(format!(
                    "record of {} bits for key {} needs a block beyond {} words",
                    new_total, key, self.max_block_words
                )));
            }
            let next_used = self.used_end(next, 0, 0)?;
            self.copy_out(next, 0, next_used, &mut scratch)?;
            spare += next.bits() - next_used;
            block.words += next.words;
            fused += 1;
        }

        if fused > 0 {
            self.fuse(block);
            self.fuses += fused;
            tracing::trace!(key, start = block.start, words = block.words, fused, "fused blocks");
        }

        self.write_record(block, loc.header_bit, new_header, payload, Some(&mut scratch))?;
        self.free_bits = self.free_bits + old_total - new_total;
        Ok(old_header)
    }

    /// Write header, payload, drained tail (if any) and zero padding
    fn write_record(
        &mut self,
        block: Block,
        at: u64,
        header: RecordHeader,
        payload: Option<&BitStream>,
        tail: Option<&mut BitStream>,
    ) -> Result<()> {
        let code = self.header;
        let mut writer = BlockWriter::new(self, block, at);
        code.encode_header(&mut writer, header)?;

        if let Some(payload) = payload {
            for (value, n) in payload.words() {
                writer.push_bits(value, n)?;
            }
        }

        if let Some(tail) = tail {
            let mut remaining = tail.len();
            while remaining > 0 {
                let n = remaining.min(64) as u32;
                writer.push_bits(tail.pop_bits(n)?, n)?;
                remaining -= n as u64;
            }
            writer.zero_fill()?;
        }
        Ok(())
    }

    /// Make `block` one block: clear every inner boundary, flag its last word
    fn fuse(&mut self, block: Block) {
        let len = self.ring.len();
        for i in 0..block.words {
            let idx = (block.start + i) % len;
            self.ring[idx].set_boundary(i + 1 == block.words);
        }
    }

    // =========================================================================
    // Block navigation
    // =========================================================================

    /// Block containing word `word`
    fn block_of(&self, word: usize) -> Result<Block> {
        let len = self.ring.len();

        let mut start = word;
        let mut steps = 0;
        while !self.ring[(start + len - 1) % len].is_boundary() {
            start = (start + len - 1) % len;
            steps += 1;
            if steps >= len {
                return Err(SeqError::InvariantViolated(
                    "ring has no boundary flag".to_string(),
                ));
            }
        }

        let mut end = word;
        while !self.ring[end].is_boundary() {
            end = (end + 1) % len;
            if end == word {
                return Err(SeqError::InvariantViolated(
                    "ring has no boundary flag".to_string(),
                ));
            }
        }

        Ok(Block {
            start,
            words: (end + len - start) % len + 1,
        })
    }

    fn next_block(&self, block: Block) -> Result<Block> {
        self.block_of((block.start + block.words) % self.ring.len())
    }

    fn skip_record(&self, reader: &mut BlockReader<'_>) -> Result<()> {
        let header = self.header.decode_header(reader)?;
        reader.skip(header.payload_bits())
    }

    /// Bit offset just past the last record of `block`, walking from the
    /// record at `pos` whose ordinal is `ordinal`
    fn used_end(&self, block: Block, pos: u64, ordinal: u64) -> Result<u64> {
        let keys = block.words as u64 * self.keys_per_word;
        let mut reader = BlockReader::new(self, block, pos);
        for _ in ordinal..keys {
            self.skip_record(&mut reader)?;
        }
        Ok(reader.pos)
    }

    // =========================================================================
    // Bit access
    // =========================================================================

    /// Ring word and in-word offset of block bit `bit`
    fn word_at(&self, block: Block, bit: u64) -> (usize, u32) {
        let idx = (block.start + (bit / PAYLOAD_BITS as u64) as usize) % self.ring.len();
        (idx, (bit % PAYLOAD_BITS as u64) as u32)
    }

    /// Read `n` (<= 64) bits at block offset `bit`, first bit most significant
    fn read_bits(&self, block: Block, bit: u64, n: u32) -> u64 {
        let mut acc = 0u64;
        let mut pos = bit;
        let mut need = n;
        while need > 0 {
            let (idx, off) = self.word_at(block, pos);
            let avail = PAYLOAD_BITS - off;
            let take = avail.min(need);
            let piece = (self.ring[idx].payload() >> (avail - take)) & mask(take);
            acc = shl(acc, take) | piece;
            pos += take as u64;
            need -= take;
        }
        acc
    }

    /// Write the low `n` (<= 64) bits of `value` at block offset `bit`
    fn write_bits(&mut self, block: Block, bit: u64, value: u64, n: u32) {
        let mut pos = bit;
        let mut need = n;
        while need > 0 {
            let (idx, off) = self.word_at(block, pos);
            let avail = PAYLOAD_BITS - off;
            let take = avail.min(need);
            let shift = avail - take;
            let piece = (value >> (need - take)) & mask(take);
            let field = mask(take) << shift;
            let word = &mut self.ring[idx];
            word.set_payload((word.payload() & !field) | (piece << shift));
            pos += take as u64;
            need -= take;
        }
    }

    /// Copy block bits `[from, to)` onto the tail of `out`
    fn copy_out(&self, block: Block, from: u64, to: u64, out: &mut BitStream) -> Result<()> {
        if to > block.bits() {
            return Err(SeqError::CorruptHeader(format!(
                "record data ends at bit {} of a {}-bit block",
                to,
                block.bits()
            )));
        }
        let mut pos = from;
        while pos < to {
            let n = (to - pos).min(64) as u32;
            out.push_bits(self.read_bits(block, pos, n), n)?;
            pos += n as u64;
        }
        Ok(())
    }
}

/// Sequential bit reader over one block
struct BlockReader<'a> {
    store: &'a CircularRecordStore,
    block: Block,
    pos: u64,
}

impl<'a> BlockReader<'a> {
    fn new(store: &'a CircularRecordStore, block: Block, pos: u64) -> Self {
        Self { store, block, pos }
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        if self.pos + n > self.block.bits() {
            return Err(SeqError::CorruptHeader(format!(
                "record payload of {} bits runs past its block",
                n
            )));
        }
        self.pos += n;
        Ok(())
    }
}

impl BitSource for BlockReader<'_> {
    fn pop_bits(&mut self, n: u32) -> Result<u64> {
        if self.pos + n as u64 > self.block.bits() {
            return Err(SeqError::CorruptHeader(format!(
                "header at bit {} runs past its block",
                self.pos
            )));
        }
        let value = self.store.read_bits(self.block, self.pos, n);
        self.pos += n as u64;
        Ok(value)
    }
}

/// Sequential bit writer over one block
struct BlockWriter<'a> {
    store: &'a mut CircularRecordStore,
    block: Block,
    pos: u64,
}

impl<'a> BlockWriter<'a> {
    fn new(store: &'a mut CircularRecordStore, block: Block, pos: u64) -> Self {
        Self { store, block, pos }
    }

    /// Clear every bit from the cursor to the end of the block
    fn zero_fill(&mut self) -> Result<()> {
        let end = self.block.bits();
        while self.pos < end {
            let n = (end - self.pos).min(PAYLOAD_BITS as u64) as u32;
            self.push_bits(0, n)?;
        }
        Ok(())
    }
}

impl BitSink for BlockWriter<'_> {
    fn push_bits(&mut self, value: u64, n: u32) -> Result<()> {
        if self.pos + n as u64 > self.block.bits() {
            return Err(SeqError::InvariantViolated(format!(
                "write of {} bits at {} overflows a {}-bit block",
                n,
                self.pos,
                self.block.bits()
            )));
        }
        self.store.write_bits(self.block, self.pos, value, n);
        self.pos += n as u64;
        Ok(())
    }
}
