//! Sorted Module
//!
//! Cascading external-merge builder for packed strings.
//!
//! ## Responsibilities
//! - Accept packed strings in any order
//! - Merge full levels into the next one (k-way tournament merge)
//! - Publish one sorted array with binary search
//!
//! ## Levels
//! ```text
//!   level 0   [s][s][s] ... up to fan_in single-string runs
//!                │ merge(0) when full
//!                ▼
//!   level 1   [run][run] ... up to fan_in sorted runs
//!                │ merge(1)
//!                ▼
//!   ...
//!   level N-1 accumulates runs; sort() folds everything into one run
//! ```
//!
//! Merges compare packed words directly, nothing is decoded.

mod builder;
mod table;
mod tournament;

pub use builder::SortedStringBuilder;
pub use table::{SortedIter, SortedTable};

use crate::error::Result;

/// Make room for `additional` more items, growing by ~1.25x + 2 at a time
pub(crate) fn reserve_growth<T>(buf: &mut Vec<T>, additional: usize) -> Result<()> {
    if buf.capacity() - buf.len() >= additional {
        return Ok(());
    }
    let capacity = buf.capacity();
    let target = (buf.len() + additional).max(capacity + capacity / 4 + 2);
    buf.try_reserve_exact(target - buf.len())?;
    Ok(())
}
