//! Shared application state for the hitcount server.
//!
//! The store client is built once at startup and handed in here; handlers
//! never reach for ambient globals.

use std::sync::Arc;

use hitcount_core::error::Result;
use hitcount_core::{CounterStore, HitCounter, RetryPolicy, Sleeper};

use crate::config::ServerConfig;
use crate::host::{HostResolver, SystemHostResolver};
use crate::obs::ServerMetrics;
use crate::store::{self, TokioSleeper};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    counter: HitCounter,
    host: Arc<dyn HostResolver>,
    metrics: Arc<ServerMetrics>,
}

impl AppState {
    /// Production wiring: store from config, tokio sleeper, system host name.
    pub fn from_config(cfg: &ServerConfig) -> Result<Self> {
        let store = store::from_config(&cfg.store)?;
        Ok(Self::new(
            store,
            Arc::new(TokioSleeper),
            Arc::new(SystemHostResolver),
            cfg.retry.policy(),
        ))
    }

    pub fn new(
        store: Arc<dyn CounterStore>,
        sleeper: Arc<dyn Sleeper>,
        host: Arc<dyn HostResolver>,
        policy: RetryPolicy,
    ) -> Self {
        let metrics = Arc::new(ServerMetrics::default());
        let counter = HitCounter::new(store, sleeper, policy).with_listener(metrics.clone());
        Self {
            inner: Arc::new(AppStateInner { counter, host, metrics }),
        }
    }

    pub fn counter(&self) -> &HitCounter {
        &self.inner.counter
    }

    pub fn host(&self) -> &dyn HostResolver {
        self.inner.host.as_ref()
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
