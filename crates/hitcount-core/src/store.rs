//! Seams between the counter service and the outside world.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// External key/counter store supporting an atomic increment.
///
/// Implementations must report unreachable/dropped connections as
/// `HitCountError::StoreConnection`; every other failure as a different kind.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one to `key` (creating it at 0 if absent) and return the new value.
    async fn incr(&self, key: &str) -> Result<u64>;
}

/// Delay between retry attempts. Injected so tests need not wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}
