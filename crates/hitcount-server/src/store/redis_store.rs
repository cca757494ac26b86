//! Redis-backed counter store.
//!
//! One `redis::Client` is opened at startup; the multiplexed connection is
//! established on first use and shared by every request. A connectivity
//! failure drops the connection it happened on so the next attempt reconnects.

use std::future::Future;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::sync::Mutex;

use hitcount_core::error::{HitCountError, Result};
use hitcount_core::CounterStore;

pub struct RedisStore {
    client: Client,
    conn: ConnectionSlot<MultiplexedConnection>,
}

impl RedisStore {
    /// Parse the URL and build the client. Does not connect.
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| HitCountError::Config(format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            conn: ConnectionSlot::new(),
        })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        let (generation, mut conn) = self
            .conn
            .get_or_connect(|| async {
                self.client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(classify)
            })
            .await?;
        let reply: RedisResult<i64> = conn.incr(key, 1).await;
        let value = match reply {
            Ok(v) => v,
            Err(e) => {
                let err = classify(e);
                if err.is_connectivity() {
                    self.conn.invalidate(generation).await;
                }
                return Err(err);
            }
        };
        u64::try_from(value)
            .map_err(|_| HitCountError::Store(format!("counter {key} is negative: {value}")))
    }
}

/// Shared connection tagged with the generation that opened it.
///
/// `invalidate` only clears the slot when it still holds the failed
/// generation, so a late failure cannot discard a newer connection.
pub(crate) struct ConnectionSlot<C> {
    inner: Mutex<SlotState<C>>,
}

struct SlotState<C> {
    generation: u64,
    conn: Option<C>,
}

impl<C: Clone> ConnectionSlot<C> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(SlotState {
                generation: 0,
                conn: None,
            }),
        }
    }

    pub(crate) async fn get_or_connect<F, Fut>(&self, connect: F) -> Result<(u64, C)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        let mut state = self.inner.lock().await;
        if let Some(conn) = state.conn.as_ref() {
            return Ok((state.generation, conn.clone()));
        }
        let conn = connect().await?;
        state.generation += 1;
        state.conn = Some(conn.clone());
        Ok((state.generation, conn))
    }

    pub(crate) async fn invalidate(&self, generation: u64) {
        let mut state = self.inner.lock().await;
        if state.generation == generation {
            state.conn = None;
        }
    }
}

/// Split redis errors into the retried connectivity kind and everything else.
pub(crate) fn classify(e: RedisError) -> HitCountError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
        HitCountError::StoreConnection(e.to_string())
    } else {
        HitCountError::Store(e.to_string())
    }
}
