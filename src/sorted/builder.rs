//! Sorted String Builder
//!
//! Collects packed strings in any order and merges them level by level.

use crate::config::MergeConfig;
use crate::error::{Result, SeqError};
use crate::extract::{string_len, PackedString};

use super::reserve_growth;
use super::table::SortedTable;
use super::tournament::Tournament;

/// One tier of the cascade: sorted runs stored back to back
#[derive(Debug, Default)]
struct Level {
    /// Packed words of every run
    words: Vec<u16>,
    /// Start offset of each run in `words`
    runs: Vec<usize>,
}

impl Level {
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn clear(&mut self) {
        self.words.clear();
        self.runs.clear();
    }

    /// Start a new run and make room for `words` more words
    fn open_run(&mut self, words: usize) -> Result<()> {
        reserve_growth(&mut self.words, words)?;
        reserve_growth(&mut self.runs, 1)?;
        self.runs.push(self.words.len());
        Ok(())
    }
}

/// Builder for one published [`SortedTable`]
///
/// Level 0 receives every appended string as a run of one. When a level
/// holds `fan_in` runs they are merged into a single run on the next level.
/// An allocation failure leaves the builder droppable but not necessarily
/// usable.
pub struct SortedStringBuilder {
    config: MergeConfig,
    levels: Vec<Level>,
    /// Total strings appended
    count: usize,
}

impl SortedStringBuilder {
    /// Create a builder with the default six levels of fan-in 255
    pub fn new() -> Self {
        let config = MergeConfig::default();
        let levels = (0..config.max_levels).map(|_| Level::default()).collect();
        Self {
            config,
            levels,
            count: 0,
        }
    }

    pub fn with_config(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let mut levels = Vec::new();
        levels.try_reserve_exact(config.max_levels)?;
        levels.resize_with(config.max_levels, Level::default);
        Ok(Self {
            config,
            levels,
            count: 0,
        })
    }

    /// Add one packed string
    pub fn append(&mut self, string: &PackedString) -> Result<()> {
        self.append_words(string.as_words())
    }

    /// Add one packed string given as raw words
    pub fn append_words(&mut self, words: &[u16]) -> Result<()> {
        if string_len(words) != Some(words.len()) {
            return Err(SeqError::CorruptCode(
                "appended words are not exactly one packed string".to_string(),
            ));
        }

        let level = &mut self.levels[0];
        level.open_run(words.len())?;
        level.words.extend_from_slice(words);
        self.count += 1;

        if self.levels[0].runs.len() >= self.config.fan_in {
            self.merge(0)?;
        }
        Ok(())
    }

    /// Merge level `level` into the next one, cascading while levels fill up.
    /// The top level never merges upward; it keeps collecting runs.
    pub fn merge(&mut self, level: usize) -> Result<()> {
        let mut current = level;
        while current + 1 < self.levels.len() {
            self.merge_into_next(current)?;
            current += 1;
            if self.levels[current].runs.len() < self.config.fan_in {
                break;
            }
        }
        Ok(())
    }

    /// k-way merge of every run of `level` into one new run of `level + 1`
    fn merge_into_next(&mut self, level: usize) -> Result<()> {
        let (lower, upper) = self.levels.split_at_mut(level + 1);
        let src = &mut lower[level];
        let dst = &mut upper[0];
        if src.is_empty() {
            return Ok(());
        }

        dst.open_run(src.words.len())?;
        let merged = Tournament::new(&src.words, &src.runs)?.drain_into(&mut dst.words)?;
        tracing::debug!(
            from_level = level,
            runs = src.runs.len(),
            strings = merged,
            words = src.words.len(),
            "merged level"
        );
        src.clear();
        Ok(())
    }

    /// Fold every level into one sorted run and publish it
    pub fn sort(mut self) -> Result<SortedTable> {
        let top = self.levels.len() - 1;
        for i in 0..top {
            if self.levels[i].is_empty() {
                continue;
            }
            let higher_empty = self.levels[i + 1..].iter().all(Level::is_empty);
            if higher_empty && self.levels[i].runs.len() == 1 {
                break;
            }
            self.merge_into_next(i)?;
        }

        let words = match self.levels.iter().rposition(|l| !l.is_empty()) {
            None => Vec::new(),
            Some(idx) if self.levels[idx].runs.len() == 1 => std::mem::take(&mut self.levels[idx].words),
            Some(idx) => {
                let level = &self.levels[idx];
                let mut out = Vec::new();
                out.try_reserve_exact(level.words.len())?;
                Tournament::new(&level.words, &level.runs)?.drain_into(&mut out)?;
                out
            }
        };

        tracing::debug!(strings = self.count, words = words.len(), "published sorted table");
        Ok(SortedTable::new(words, self.count))
    }

    /// Total strings appended
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Runs currently held by each level
    pub fn level_counts(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.runs.len()).collect()
    }
}

impl Default for SortedStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}
