//! hitcount core: the counter service and the seams it talks through.
//!
//! This crate owns the bounded-retry increment (`HitCounter`), the store and
//! sleep abstractions it is driven by, and the error surface shared with the
//! HTTP server. It carries no transport or runtime dependencies so the retry
//! loop can be exercised with fakes and no real elapsed time.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `HitCountError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod counter;
pub mod error;
pub mod store;

pub use counter::{HitCounter, RetryListener, RetryPolicy, HIT_COUNTER_KEY};
/// Shared result type.
pub use error::{HitCountError, Result};
pub use store::{CounterStore, Sleeper};
