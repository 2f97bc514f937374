//! Error types for seqstore
//!
//! Provides a unified error type for all operations. Nothing in the crate
//! aborts the process: corrupted input and broken invariants surface here.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result type alias using SeqError
pub type Result<T> = std::result::Result<T, SeqError>;

/// Unified error type for seqstore operations
#[derive(Debug, Error)]
pub enum SeqError {
    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Allocation failed: {0}")]
    OutOfMemory(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Value {value} is outside the codec range (limit {limit})")]
    ValueOutOfRange { value: u64, limit: u64 },

    #[error("Context codec requires non-decreasing input: {value} after {last}")]
    NotMonotonic { last: u64, value: u64 },

    #[error("Corrupt code: {0}")]
    CorruptCode(String),

    // -------------------------------------------------------------------------
    // Record Store Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record header: {0}")]
    CorruptHeader(String),

    #[error("Key {key} out of range (capacity {capacity})")]
    KeyOutOfRange { key: u64, capacity: u64 },

    #[error("Key {0} is absent")]
    KeyNotFound(u64),

    #[error("No free key found after {attempts} attempts")]
    KeySpaceExhausted { attempts: u32 },

    #[error("Store is over-full: {0}")]
    StoreFull(String),

    // -------------------------------------------------------------------------
    // Internal Errors
    // -------------------------------------------------------------------------
    #[error("Invariant violated: {0}")]
    InvariantViolated(String),
}

impl From<TryReserveError> for SeqError {
    fn from(e: TryReserveError) -> Self {
        SeqError::OutOfMemory(e.to_string())
    }
}
