//! Store statistics
//!
//! Advisory load figures used to decide when to rebuild a store larger.

/// Snapshot of how full a store is, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Fuses performed relative to the ring's word count (capped at 100)
    pub fuse_percent: u64,
    /// Share of payload bits not used by any record
    pub free_bit_percent: u64,
    /// Share of K-keys that are absent
    pub free_key_percent: u64,
    /// Highest pressure of the three: fuses, used bits, used keys
    pub worst_percent: u64,
}

impl StoreStats {
    pub(crate) fn compute(
        fuses: u64,
        word_count: u64,
        free_bits: u64,
        total_bits: u64,
        free_keys: u64,
        key_capacity: u64,
    ) -> Self {
        let fuse_percent = (fuses * 100 / word_count.max(1)).min(100);
        let free_bit_percent = free_bits * 100 / total_bits.max(1);
        let free_key_percent = free_keys * 100 / key_capacity.max(1);
        let worst_percent = fuse_percent
            .max(100 - free_bit_percent)
            .max(100 - free_key_percent);
        Self {
            fuse_percent,
            free_bit_percent,
            free_key_percent,
            worst_percent,
        }
    }

    /// Whether the worst pressure has reached `threshold_percent`
    pub fn needs_resize(&self, threshold_percent: u64) -> bool {
        self.worst_percent >= threshold_percent
    }
}
