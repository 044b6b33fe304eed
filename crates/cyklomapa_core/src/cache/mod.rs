//! Shared response cache boundary.
//!
//! # Responsibility
//! - Define the one cache operation the write path consumes: `clear()`.
//! - Provide a process-local keyed cache for rendered map responses.
//!
//! # Invariants
//! - `clear()` drops every entry; there is no key-scoped invalidation.
//! - `clear()` is idempotent and safe to call from concurrent writers.

use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache namespace invalidated by map writes.
pub trait ResponseCache {
    /// Drops every cached response.
    fn clear(&self);
}

impl<C: ResponseCache + ?Sized> ResponseCache for Arc<C> {
    fn clear(&self) {
        (**self).clear();
    }
}

impl<C: ResponseCache + ?Sized> ResponseCache for &C {
    fn clear(&self) {
        (**self).clear();
    }
}

/// In-memory response cache keyed by request path.
#[derive(Debug, Default)]
pub struct MemoryResponseCache {
    entries: Mutex<HashMap<String, String>>,
    clears: AtomicU64,
}

impl MemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, body: impl Into<String>) {
        self.entries().insert(key.into(), body.into());
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Number of full clears since construction.
    pub fn clear_count(&self) -> u64 {
        self.clears.load(Ordering::SeqCst)
    }

    // A panic while holding the lock leaves a plain map behind; keep using it.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseCache for MemoryResponseCache {
    fn clear(&self) {
        let dropped = {
            let mut entries = self.entries();
            let dropped = entries.len();
            entries.clear();
            dropped
        };
        let generation = self.clears.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("event=cache_clear module=cache status=ok dropped={dropped} generation={generation}");
    }
}
