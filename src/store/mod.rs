//! Store Module
//!
//! Fixed-capacity circular record store with online compaction.
//!
//! ## Responsibilities
//! - Keep one self-delimiting record per K-key in a fixed ring of words
//! - Read / insert / update / delete records by key
//! - Grow records in place, fusing a block with its successor when it runs
//!   out of room
//! - Track free keys and free bits so callers know when to rebuild larger
//!
//! ## Ring Word
//! ```text
//!    63   62                                                 0
//!   ┌───┬─────────────────────────────────────────────────────┐
//!   │ B │                  63 payload bits                    │
//!   └───┴─────────────────────────────────────────────────────┘
//!   B = boundary flag, set on the last word of each block
//! ```
//!
//! ## Record
//! ```text
//!   ┌──────────────────────┬──────────────────────┐
//!   │ header (chunked code)│ payload (n bits)     │
//!   └──────────────────────┴──────────────────────┘
//!   header raw value: 0 absent, 1 present-empty, n + 1 for n payload bits
//! ```

mod keys;
mod ring;
mod shared;
mod stats;
mod word;

pub use keys::{HashedProbe, KeyDeriver, SequentialProbe};
pub use ring::{Block, CircularRecordStore, Location};
pub use shared::SharedStore;
pub use stats::StoreStats;
pub use word::{RingWord, PAYLOAD_BITS};
