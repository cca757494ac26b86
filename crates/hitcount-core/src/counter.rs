//! Counter service: increment-and-get with bounded connection retry.
//!
//! States of one call:
//! - ATTEMPTING -> SUCCEEDED on a successful increment.
//! - ATTEMPTING -> FAILED_TRANSIENT on a connectivity error while budget > 0;
//!   back to ATTEMPTING after `policy.delay`, budget decremented.
//! - ATTEMPTING -> EXHAUSTED on a connectivity error with budget == 0;
//!   the last connectivity error is returned.
//! - Any other error is returned as-is, with no retry and no sleep.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{HitCountError, Result};
use crate::store::{CounterStore, Sleeper};

/// Name of the counter held in the store.
pub const HIT_COUNTER_KEY: &str = "hits";

/// Fixed-delay retry budget for one `increment_and_get` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-attempts allowed after the initial attempt.
    pub max_retries: u32,
    /// Pause before every re-attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Upper bound on attempts for one call (initial + retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Observer for retry decisions (metrics hook).
///
/// `attempt` is 1-based and names the attempt that just failed.
pub trait RetryListener: Send + Sync {
    fn on_retry(&self, _attempt: u32, _err: &HitCountError) {}
    fn on_exhausted(&self, _attempt: u32, _err: &HitCountError) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RetryListener for NoopListener {}

/// Increments the shared `hits` counter, hiding transient connectivity
/// failures up to the policy's budget.
#[derive(Clone)]
pub struct HitCounter {
    store: Arc<dyn CounterStore>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    listener: Arc<dyn RetryListener>,
}

impl HitCounter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            sleeper,
            policy,
            listener: Arc::new(NoopListener),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn RetryListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Increment `hits` and return the value reported by the store.
    pub async fn increment_and_get(&self) -> Result<u64> {
        let mut retries_left = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.store.incr(HIT_COUNTER_KEY).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_connectivity() => {
                    tracing::warn!(
                        attempt,
                        retries_left,
                        error = %err,
                        "exception occurred while connecting to the store"
                    );
                    if retries_left == 0 {
                        self.listener.on_exhausted(attempt, &err);
                        return Err(err);
                    }
                    retries_left -= 1;
                    self.listener.on_retry(attempt, &err);
                    self.sleeper.sleep(self.policy.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
