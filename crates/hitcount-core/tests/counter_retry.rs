#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hitcount_core::counter::RetryListener;
use hitcount_core::{
    CounterStore, HitCountError, HitCounter, Result, RetryPolicy, Sleeper, HIT_COUNTER_KEY,
};

/// Plays back scripted failures, then counts like a real store.
#[derive(Default)]
struct ScriptedStore {
    script: Mutex<VecDeque<HitCountError>>,
    fail_forever: Option<HitCountError>,
    value: AtomicU64,
    attempts: AtomicU32,
    keys: Mutex<Vec<String>>,
}

impl ScriptedStore {
    fn failing_times(err: HitCountError, times: usize) -> Self {
        Self {
            script: Mutex::new(std::iter::repeat(err).take(times).collect()),
            ..Default::default()
        }
    }

    fn always_failing(err: HitCountError) -> Self {
        Self { fail_forever: Some(err), ..Default::default() }
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for ScriptedStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(key.to_string());
        if let Some(err) = &self.fail_forever {
            return Err(err.clone());
        }
        if let Some(err) = self.script.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.value.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn count(&self) -> usize {
        self.delays.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

#[derive(Default)]
struct CountingListener {
    retries: AtomicU32,
    exhausted: AtomicU32,
}

impl RetryListener for CountingListener {
    fn on_retry(&self, _attempt: u32, _err: &HitCountError) {
        self.retries.fetch_add(1, Ordering::SeqCst);
    }
    fn on_exhausted(&self, _attempt: u32, _err: &HitCountError) {
        self.exhausted.fetch_add(1, Ordering::SeqCst);
    }
}

/// Captures formatted `tracing` output for the current thread.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

const FAILURE_LOG: &str = "exception occurred while connecting to the store";

fn conn_err() -> HitCountError {
    HitCountError::StoreConnection("connection refused".into())
}

fn counter(store: &Arc<ScriptedStore>, sleeper: &Arc<RecordingSleeper>) -> HitCounter {
    HitCounter::new(store.clone(), sleeper.clone(), RetryPolicy::default())
}

#[tokio::test]
async fn successive_calls_return_consecutive_values() {
    let store = Arc::new(ScriptedStore::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let c = counter(&store, &sleeper);

    let mut seen = Vec::new();
    for _ in 0..10 {
        seen.push(c.increment_and_get().await.unwrap());
    }

    assert_eq!(seen, (1..=10).collect::<Vec<u64>>());
    assert_eq!(sleeper.count(), 0);
    assert!(store.keys.lock().unwrap().iter().all(|k| k == HIT_COUNTER_KEY));
}

#[tokio::test]
async fn recovers_after_fewer_failures_than_budget() {
    for k in 0..5usize {
        let store = Arc::new(ScriptedStore::failing_times(conn_err(), k));
        let sleeper = Arc::new(RecordingSleeper::default());
        let c = counter(&store, &sleeper);

        assert_eq!(c.increment_and_get().await.unwrap(), 1, "k={k}");
        assert_eq!(store.attempts() as usize, k + 1, "k={k}");
        assert_eq!(sleeper.count(), k, "k={k}");
        assert!(sleeper
            .delays
            .lock()
            .unwrap()
            .iter()
            .all(|d| *d == Duration::from_millis(500)));
    }
}

#[tokio::test]
async fn exactly_five_failures_still_succeeds_on_last_attempt() {
    let store = Arc::new(ScriptedStore::failing_times(conn_err(), 5));
    let sleeper = Arc::new(RecordingSleeper::default());

    assert_eq!(counter(&store, &sleeper).increment_and_get().await.unwrap(), 1);
    assert_eq!(store.attempts(), 6);
    assert_eq!(sleeper.count(), 5);
}

#[tokio::test]
async fn gives_up_after_six_attempts() {
    let store = Arc::new(ScriptedStore::always_failing(conn_err()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let listener = Arc::new(CountingListener::default());
    let c = counter(&store, &sleeper).with_listener(listener.clone());

    let err = c.increment_and_get().await.expect_err("must exhaust");

    assert_eq!(err, conn_err());
    assert_eq!(store.attempts(), 6);
    assert_eq!(sleeper.count(), 5);
    assert_eq!(listener.retries.load(Ordering::SeqCst), 5);
    assert_eq!(listener.exhausted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn other_store_errors_are_not_retried() {
    let store = Arc::new(ScriptedStore::failing_times(
        HitCountError::Store(
            "WRONGTYPE Operation against a key holding the wrong kind of value".into(),
        ),
        1,
    ));
    let sleeper = Arc::new(RecordingSleeper::default());

    let err = counter(&store, &sleeper).increment_and_get().await.expect_err("must fail");

    assert!(matches!(err, HitCountError::Store(_)));
    assert_eq!(store.attempts(), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn custom_policy_bounds_attempts() {
    let store = Arc::new(ScriptedStore::always_failing(conn_err()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let c = HitCounter::new(
        store.clone(),
        sleeper.clone(),
        RetryPolicy::new(0, Duration::from_millis(10)),
    );

    assert!(c.increment_and_get().await.unwrap_err().is_connectivity());
    assert_eq!(store.attempts(), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn each_call_gets_a_fresh_budget() {
    // 5 failures, success, then 5 more failures, success.
    let store = Arc::new(ScriptedStore::failing_times(conn_err(), 5));
    let sleeper = Arc::new(RecordingSleeper::default());
    let c = counter(&store, &sleeper);

    assert_eq!(c.increment_and_get().await.unwrap(), 1);
    store.script.lock().unwrap().extend(std::iter::repeat(conn_err()).take(5));
    assert_eq!(c.increment_and_get().await.unwrap(), 2);
    assert_eq!(store.attempts(), 12);
    assert_eq!(sleeper.count(), 10);
}

#[tokio::test]
async fn every_connectivity_failure_is_logged() {
    let logs = LogBuffer::default();
    let _guard = logs.install();

    let store = Arc::new(ScriptedStore::always_failing(conn_err()));
    let sleeper = Arc::new(RecordingSleeper::default());
    counter(&store, &sleeper).increment_and_get().await.unwrap_err();

    let text = logs.text();
    let lines: Vec<&str> = text.lines().filter(|l| l.contains(FAILURE_LOG)).collect();
    assert_eq!(lines.len(), 6, "{text}");
    assert!(lines.iter().all(|l| l.contains("WARN")));
    assert!(lines[0].contains("retries_left=5"));
    assert!(lines[5].contains("retries_left=0"));
}

#[tokio::test]
async fn recovered_failures_are_logged_once_each() {
    let logs = LogBuffer::default();
    let _guard = logs.install();

    let store = Arc::new(ScriptedStore::failing_times(conn_err(), 2));
    let sleeper = Arc::new(RecordingSleeper::default());
    assert_eq!(counter(&store, &sleeper).increment_and_get().await.unwrap(), 1);

    assert_eq!(logs.text().matches(FAILURE_LOG).count(), 2);
}

#[tokio::test]
async fn other_store_errors_are_not_logged_as_connectivity() {
    let logs = LogBuffer::default();
    let _guard = logs.install();

    let store = Arc::new(ScriptedStore::failing_times(HitCountError::Store("ERR".into()), 1));
    let sleeper = Arc::new(RecordingSleeper::default());
    counter(&store, &sleeper).increment_and_get().await.unwrap_err();

    assert_eq!(logs.text().matches(FAILURE_LOG).count(), 0);
}
