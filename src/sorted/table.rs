//! Sorted Table
//!
//! The published, read-only result of [`SortedStringBuilder::sort`](super::SortedStringBuilder::sort).

use std::cmp::Ordering;

use crate::extract::{compare_packed, is_terminal, string_len};

/// Packed strings stored back to back in ascending order
#[derive(Debug, Clone, Default)]
pub struct SortedTable {
    words: Vec<u16>,
    count: usize,
}

impl SortedTable {
    pub(crate) fn new(words: Vec<u16>, count: usize) -> Self {
        Self { words, count }
    }

    /// Number of strings
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw packed words
    pub fn as_words(&self) -> &[u16] {
        &self.words
    }

    /// Last string `<= target`, or `None` if `target` precedes every string
    ///
    /// Strings have no fixed stride, so each probe walks back from the
    /// midpoint to the previous terminal word to find a string start.
    pub fn find(&self, target: &[u16]) -> Option<&[u16]> {
        let words = &self.words;
        let mut lo = 0;
        let mut hi = words.len();
        let mut best = None;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mut start = mid;
            while start > lo && !is_terminal(words[start - 1]) {
                start -= 1;
            }
            let len = string_len(&words[start..hi]).unwrap_or(hi - start);
            let candidate = &words[start..start + len];

            if compare_packed(candidate, target) == Ordering::Greater {
                hi = start;
            } else {
                best = Some(candidate);
                lo = start + len;
            }
        }
        best
    }

    /// Whether a string equal to `target` is stored
    pub fn contains(&self, target: &[u16]) -> bool {
        self.find(target)
            .map(|s| compare_packed(s, target) == Ordering::Equal)
            .unwrap_or(false)
    }

    /// Strings in ascending order
    pub fn iter(&self) -> SortedIter<'_> {
        SortedIter {
            words: &self.words,
            pos: 0,
        }
    }
}

/// Iterator over the strings of a [`SortedTable`]
pub struct SortedIter<'a> {
    words: &'a [u16],
    pos: usize,
}

impl<'a> Iterator for SortedIter<'a> {
    type Item = &'a [u16];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.words[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let len = string_len(rest).unwrap_or(rest.len());
        self.pos += len;
        Some(&rest[..len])
    }
}
