//! # seqstore
//!
//! Compact in-memory storage for variable-length integer sequences:
//! - Bit-level stream primitive
//! - Table-driven variable-length integer codes (direct, remapped, delta)
//! - Cascading k-way merge builder for packed sorted strings
//! - Circular record store with online block compaction
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Text indexing layer (caller)                │
//! │        token / document ids, frequencies, positions          │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                ▼                               ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │  SortedStringBuilder   │       │  CircularRecordStore   │
//!   │  (levels, tournament)  │       │  (ring, fuse)          │
//!   └───────────┬────────────┘       └───────────┬────────────┘
//!               │                                │
//!               ▼                                │
//!   ┌────────────────────────┐                   │
//!   │  Extractor (16-bit     │                   │
//!   │  packed words)         │                   │
//!   └───────────┬────────────┘                   │
//!               │                                │
//!               ▼                                ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │              Codec  ──►  BitStream                      │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every structure is single-owner and synchronous; wrap a store in
//! [`store::SharedStore`] (or your own lock) to share it between threads.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bits;
pub mod codec;
pub mod extract;
pub mod sorted;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SeqError};
pub use config::{KeyDensity, MergeConfig, StoreConfig};
pub use bits::BitStream;
pub use codec::{ContextCodec, IntCodec, RemappedCodec, TableCodec, UniversalCode};
pub use extract::PackedString;
pub use sorted::{SortedStringBuilder, SortedTable};
pub use store::{CircularRecordStore, SharedStore, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seqstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
