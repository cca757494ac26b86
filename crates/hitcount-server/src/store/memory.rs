use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use hitcount_core::error::{HitCountError, Result};
use hitcount_core::CounterStore;

/// Process-local counters. Never fails; values are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    counters: DashMap<String, AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { counters: DashMap::new() }
    }

    /// Seed a counter (demo data, tests).
    pub fn set(&self, key: impl Into<String>, value: u64) {
        self.counters.insert(key.into(), AtomicU64::new(value));
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counters.get(key).map(|c| c.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        let bumped = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1));
        bumped
            .map(|previous| previous + 1)
            .map_err(|_| HitCountError::Store(format!("counter {key} is at its maximum")))
    }
}
