//! Shared store handle
//!
//! The store never locks internally. This wraps one store in a single
//! `parking_lot::Mutex` so several threads can take turns using it.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};

use crate::bits::BitStream;
use crate::error::Result;

use super::ring::CircularRecordStore;
use super::stats::StoreStats;

/// Cloneable, lock-guarded handle to one [`CircularRecordStore`]
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CircularRecordStore>>,
}

impl SharedStore {
    pub fn new(store: CircularRecordStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, CircularRecordStore> {
        self.inner.lock()
    }

    pub fn read(&self, key: u64) -> Result<Option<BitStream>> {
        self.inner.lock().read(key)
    }

    pub fn read_bytes(&self, key: u64) -> Result<Option<Bytes>> {
        self.inner.lock().read_bytes(key)
    }

    pub fn insert(&self, ident: u64, payload: &BitStream) -> Result<u64> {
        self.inner.lock().insert(ident, payload)
    }

    pub fn insert_bytes(&self, ident: u64, payload: &[u8]) -> Result<u64> {
        self.inner.lock().insert_bytes(ident, payload)
    }

    pub fn update(&self, key: u64, payload: &BitStream) -> Result<()> {
        self.inner.lock().update(key, payload)
    }

    pub fn delete(&self, key: u64) -> Result<()> {
        self.inner.lock().delete(key)
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }
}
