//! Configuration for seqstore
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, SeqError};

/// Configuration for a [`CircularRecordStore`](crate::store::CircularRecordStore)
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Capacity Configuration
    // -------------------------------------------------------------------------
    /// Target number of K-keys. The real capacity is rounded up to a whole
    /// number of ring words and nudged away from small prime factors.
    pub key_capacity: u64,

    /// How many K-keys share one ring word
    pub density: KeyDensity,

    // -------------------------------------------------------------------------
    // Growth Configuration
    // -------------------------------------------------------------------------
    /// Largest share of the ring a single block may grow to through fuses
    pub fuse_limit: FuseLimit,

    /// Number of synthetic keys `insert` tries before giving up
    pub probe_limit: u32,
}

/// Keys stored per ring word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDensity {
    One,
    Two,
    Four,
    Eight,
}

impl KeyDensity {
    /// Number of keys per word
    pub fn keys_per_word(self) -> u64 {
        match self {
            KeyDensity::One => 1,
            KeyDensity::Two => 2,
            KeyDensity::Four => 4,
            KeyDensity::Eight => 8,
        }
    }

    /// Digit width of record headers. Sparser rings get wider digits so
    /// that typical lengths fit in one chunk; denser rings keep absent
    /// headers short enough that a word still holds all its keys.
    pub fn header_lenlen(self) -> u32 {
        match self {
            KeyDensity::One => 10,
            KeyDensity::Two => 8,
            KeyDensity::Four => 6,
            KeyDensity::Eight => 4,
        }
    }
}

impl TryFrom<u32> for KeyDensity {
    type Error = SeqError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(KeyDensity::One),
            2 => Ok(KeyDensity::Two),
            4 => Ok(KeyDensity::Four),
            8 => Ok(KeyDensity::Eight),
            other => Err(SeqError::InvalidConfiguration(format!(
                "keys per word must be 1, 2, 4 or 8, got {}",
                other
            ))),
        }
    }
}

/// Fraction of the ring (numerator / denominator) one block may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseLimit {
    pub numerator: u64,
    pub denominator: u64,
}

impl FuseLimit {
    /// Validate the fraction: it must lie in (0, 1]
    pub fn validate(self) -> Result<Self> {
        if self.denominator == 0 || self.numerator == 0 || self.numerator > self.denominator {
            return Err(SeqError::InvalidConfiguration(format!(
                "fuse limit {}/{} must lie in (0, 1]",
                self.numerator, self.denominator
            )));
        }
        Ok(self)
    }

    /// Largest block size in words for a ring of `word_count` words
    ///
    /// Computed in 128 bits; the fraction is at most 1, so the result fits
    /// back in a `u64` for any validated limit.
    pub fn max_block_words(self, word_count: u64) -> u64 {
        let words = word_count as u128 * self.numerator as u128 / self.denominator.max(1) as u128;
        u64::try_from(words).unwrap_or(word_count).max(1)
    }
}

impl Default for FuseLimit {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 3,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_capacity: 4096,
            density: KeyDensity::Four,
            fuse_limit: FuseLimit::default(),
            probe_limit: 64,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the target number of keys
    pub fn key_capacity(mut self, keys: u64) -> Self {
        self.config.key_capacity = keys;
        self
    }

    /// Set the key density
    pub fn density(mut self, density: KeyDensity) -> Self {
        self.config.density = density;
        self
    }

    /// Set the fuse growth limit as a fraction of the ring
    pub fn fuse_limit(mut self, numerator: u64, denominator: u64) -> Self {
        self.config.fuse_limit = FuseLimit {
            numerator,
            denominator,
        };
        self
    }

    /// Set how many synthetic keys an insert may probe
    pub fn probe_limit(mut self, attempts: u32) -> Self {
        self.config.probe_limit = attempts;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

/// Configuration for a [`SortedStringBuilder`](crate::sorted::SortedStringBuilder)
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Number of merge tiers
    pub max_levels: usize,

    /// Runs a level may hold before it is merged into the next one
    pub fan_in: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_levels: 6,
            fan_in: 255,
        }
    }
}

impl MergeConfig {
    /// Create a new config builder
    pub fn builder() -> MergeConfigBuilder {
        MergeConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_levels == 0 || self.fan_in < 2 {
            return Err(SeqError::InvalidConfiguration(format!(
                "merge config needs at least one level and a fan-in of 2 (got {} levels, fan-in {})",
                self.max_levels, self.fan_in
            )));
        }
        Ok(())
    }
}

/// Builder for MergeConfig
#[derive(Default)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    /// Set the number of levels
    pub fn max_levels(mut self, levels: usize) -> Self {
        self.config.max_levels = levels;
        self
    }

    /// Set the per-level fan-in
    pub fn fan_in(mut self, runs: usize) -> Self {
        self.config.fan_in = runs;
        self
    }

    pub fn build(self) -> MergeConfig {
        self.config
    }
}
