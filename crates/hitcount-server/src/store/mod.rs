//! Adapters for the counter service seams: stores and the retry sleeper.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hitcount_core::error::{HitCountError, Result};
use hitcount_core::{CounterStore, Sleeper};

use crate::config::{StoreKind, StoreSection};

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Real-time delay on the tokio timer; only the calling request waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Build the process-wide store client selected by config.
pub fn from_config(cfg: &StoreSection) -> Result<Arc<dyn CounterStore>> {
    match cfg.kind {
        StoreKind::Redis => {
            let url = cfg
                .url
                .as_deref()
                .ok_or_else(|| HitCountError::Config("redis store requires a url".into()))?;
            Ok(Arc::new(RedisStore::open(url)?))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
