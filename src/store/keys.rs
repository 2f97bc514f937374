//! Key derivation strategies for `insert`

/// Produces the synthetic K-key candidates tried by
/// [`CircularRecordStore::insert`](super::CircularRecordStore::insert).
///
/// `ident` stands for the caller's identifying fields (already hashed or
/// numbered by the caller); `attempt` is the disambiguator, counting up from
/// 0. The store reduces the result modulo its key capacity.
pub trait KeyDeriver: Send + Sync {
    fn derive(&self, ident: u64, attempt: u32) -> u64;
}

/// `ident + attempt`: plain linear probing from the identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialProbe;

impl KeyDeriver for SequentialProbe {
    fn derive(&self, ident: u64, attempt: u32) -> u64 {
        ident.wrapping_add(attempt as u64)
    }
}

/// Scrambles the identifier first, then probes linearly
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedProbe;

impl KeyDeriver for HashedProbe {
    fn derive(&self, ident: u64, attempt: u32) -> u64 {
        splitmix64(ident).wrapping_add(attempt as u64)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
