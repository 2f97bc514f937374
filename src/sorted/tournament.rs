//! Tournament merge
//!
//! Binary winner tree over one cursor per sorted run. Each step emits the
//! smallest current string, advances that run's cursor and replays only the
//! path from its leaf to the root.

use std::cmp::Ordering;

use crate::error::{Result, SeqError};
use crate::extract::{compare_packed, string_len};

use super::reserve_growth;

/// Leaf value for an empty slot of the tree
const NONE: usize = usize::MAX;

/// Position inside one run
#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Start of the current string
    pos: usize,
    /// End of the run
    end: usize,
    /// Run fully consumed
    expired: bool,
}

pub(crate) struct Tournament<'a> {
    words: &'a [u16],
    cursors: Vec<Cursor>,
    /// Heap-shaped tree; `tree[1]` is the overall winner, leaves start at `leaves`
    tree: Vec<usize>,
    leaves: usize,
}

impl<'a> Tournament<'a> {
    /// `runs` holds the start offset of every run in `words`, ascending
    pub(crate) fn new(words: &'a [u16], runs: &[usize]) -> Result<Self> {
        let mut cursors = Vec::new();
        cursors.try_reserve_exact(runs.len())?;
        for (i, &start) in runs.iter().enumerate() {
            let end = runs.get(i + 1).copied().unwrap_or(words.len());
            cursors.push(Cursor {
                pos: start,
                end,
                expired: start >= end,
            });
        }

        let leaves = runs.len().next_power_of_two().max(1);
        let mut tree = Vec::new();
        tree.try_reserve_exact(2 * leaves)?;
        tree.resize(2 * leaves, NONE);
        for i in 0..runs.len() {
            tree[leaves + i] = i;
        }

        let mut tournament = Self {
            words,
            cursors,
            tree,
            leaves,
        };
        for node in (1..leaves).rev() {
            tournament.tree[node] =
                tournament.winner(tournament.tree[2 * node], tournament.tree[2 * node + 1]);
        }
        Ok(tournament)
    }

    /// Current string of run `idx`, if it has one
    fn current(&self, idx: usize) -> Option<&'a [u16]> {
        let cursor = self.cursors.get(idx)?;
        if cursor.expired {
            return None;
        }
        let words: &'a [u16] = self.words;
        let rest = &words[cursor.pos..cursor.end];
        string_len(rest).map(|len| &rest[..len])
    }

    /// Smaller of two runs; ties go to the earlier run
    fn winner(&self, left: usize, right: usize) -> usize {
        match (self.current(left), self.current(right)) {
            (None, None) => NONE,
            (Some(_), None) => left,
            (None, Some(_)) => right,
            (Some(a), Some(b)) => match compare_packed(a, b) {
                Ordering::Greater => right,
                _ => left,
            },
        }
    }

    /// Move run `idx` past its current string, expiring it at the end
    fn advance(&mut self, idx: usize, len: usize) {
        let cursor = &mut self.cursors[idx];
        cursor.pos += len;
        if cursor.pos >= cursor.end {
            cursor.expired = true;
        }
    }

    /// Recompute the path from leaf `idx` to the root
    fn replay(&mut self, idx: usize) {
        let mut node = (self.leaves + idx) / 2;
        while node >= 1 {
            self.tree[node] = self.winner(self.tree[2 * node], self.tree[2 * node + 1]);
            node /= 2;
        }
    }

    /// Append every string, in order, to `out`. Returns the number of strings.
    pub(crate) fn drain_into(mut self, out: &mut Vec<u16>) -> Result<usize> {
        let mut emitted = 0;
        loop {
            let idx = self.tree[1];
            let best = match self.current(idx) {
                Some(best) => best,
                None if self.cursors.iter().all(|c| c.expired) => break,
                None => {
                    return Err(SeqError::InvariantViolated(
                        "merge run holds a string without a terminal word".to_string(),
                    ))
                }
            };
            reserve_growth(out, best.len())?;
            out.extend_from_slice(best);
            emitted += 1;
            self.advance(idx, best.len());
            self.replay(idx);
        }
        Ok(emitted)
    }
}
