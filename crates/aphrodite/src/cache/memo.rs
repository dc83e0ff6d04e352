//! Keyed memoization with in-flight sharing.
//!
//! Each key is either absent, in flight, or cached with an expiry. Concurrent
//! callers for an in-flight key await the same shared future, so a key is never
//! computed twice at once. The shared future settles its own slot when it
//! completes: success installs the value, failure clears the slot so the next
//! caller retries.

use crate::cache::clock::Clock;
use crate::error::EngineError;
use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Expired entries are swept once the map reaches this many slots; the mark
/// then moves to twice the surviving size.
const MIN_SWEEP_MARK: usize = 64;

type SharedResult<V> = Shared<BoxFuture<'static, Result<V, EngineError>>>;

enum Slot<V> {
    InFlight { flight: u64, future: SharedResult<V> },
    Cached { value: V, expires_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Served from a fresh cached value
    pub hits: u64,
    /// Started a new computation
    pub misses: u64,
    /// Awaited somebody else's computation
    pub joins: u64,
    /// Computations that actually ran to completion
    pub computations: u64,
    /// Expired values dropped by sweeps
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    joins: AtomicU64,
    computations: AtomicU64,
    next_flight: AtomicU64,
    evictions: AtomicU64,
}

struct Inner<V> {
    name: &'static str,
    slots: Mutex<HashMap<String, Slot<V>>>,
    /// `None` shares in-flight work but keeps nothing afterwards.
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
    counters: Counters,
    sweep_mark: AtomicUsize,
}

fn drop_expired<V>(slots: &mut HashMap<String, Slot<V>>, now: DateTime<Utc>) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| match slot {
        Slot::Cached { expires_at, .. } => *expires_at > now,
        Slot::InFlight { .. } => true,
    });
    before - slots.len()
}

impl<V: Clone> Inner<V> {
    /// Called with the slot lock held, before a new key goes in.
    fn sweep_if_due(&self, slots: &mut HashMap<String, Slot<V>>, now: DateTime<Utc>) {
        if slots.len() < self.sweep_mark.load(Ordering::Relaxed) {
            return;
        }
        let dropped = drop_expired(slots, now);
        self.counters.evictions.fetch_add(dropped as u64, Ordering::Relaxed);
        self.sweep_mark
            .store((slots.len() * 2).max(MIN_SWEEP_MARK), Ordering::Relaxed);
        if dropped > 0 {
            log::debug!("{} cache swept {} expired entries", self.name, dropped);
        }
    }

    fn settle(&self, key: &str, flight: u64, result: &Result<V, EngineError>) {
        self.counters.computations.fetch_add(1, Ordering::Relaxed);
        let mut slots = self.slots.lock();
        // Only the flight that owns the slot may settle it.
        let ours = matches!(slots.get(key), Some(Slot::InFlight { flight: f, .. }) if *f == flight);
        if !ours {
            return;
        }
        match (result, self.ttl) {
            (Ok(value), Some(ttl)) => {
                let expires_at = self.clock.now() + ttl;
                slots.insert(
                    key.to_string(),
                    Slot::Cached {
                        value: value.clone(),
                        expires_at,
                    },
                );
            }
            (Err(e), _) => {
                log::debug!("{} cache: computation for {} failed: {}", self.name, key, e);
                slots.remove(key);
            }
            (Ok(_), None) => {
                slots.remove(key);
            }
        }
    }
}

pub struct MemoCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for MemoCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> MemoCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Cache that keeps successful results for `ttl` (at least one millisecond).
    pub fn new(name: &'static str, ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::from_std(ttl)
            .unwrap_or_else(|_| Duration::days(365))
            .max(Duration::milliseconds(1));
        Self::build(name, Some(ttl), clock)
    }

    /// Dedup only: concurrent callers share a computation, nothing is retained.
    pub fn flight_only(name: &'static str, clock: Arc<dyn Clock>) -> Self {
        Self::build(name, None, clock)
    }

    fn build(name: &'static str, ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                slots: Mutex::new(HashMap::new()),
                ttl,
                clock,
                counters: Counters::default(),
                sweep_mark: AtomicUsize::new(MIN_SWEEP_MARK),
            }),
        }
    }

    /// Return the fresh cached value for `key`, join its in-flight computation,
    /// or start `compute`.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<V, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, EngineError>> + Send + 'static,
    {
        let future = {
            let mut slots = self.inner.slots.lock();
            let now = self.inner.clock.now();
            match slots.get(key) {
                Some(Slot::Cached { value, expires_at }) if *expires_at > now => {
                    self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                    log::debug!("{} cache hit for {}", self.inner.name, key);
                    return Ok(value.clone());
                }
                Some(Slot::InFlight { future, .. }) => {
                    self.inner.counters.joins.fetch_add(1, Ordering::Relaxed);
                    log::debug!("{} cache joined in-flight {}", self.inner.name, key);
                    future.clone()
                }
                _ => {
                    self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
                    log::debug!("{} cache miss for {}", self.inner.name, key);
                    self.inner.sweep_if_due(&mut slots, now);
                    let flight = self.inner.counters.next_flight.fetch_add(1, Ordering::Relaxed);
                    let future = self.start(key, flight, compute());
                    slots.insert(
                        key.to_string(),
                        Slot::InFlight {
                            flight,
                            future: future.clone(),
                        },
                    );
                    future
                }
            }
        };
        future.await
    }

    fn start<Fut>(&self, key: &str, flight: u64, compute: Fut) -> SharedResult<V>
    where
        Fut: Future<Output = Result<V, EngineError>> + Send + 'static,
    {
        let inner: Weak<Inner<V>> = Arc::downgrade(&self.inner);
        let key = key.to_string();
        async move {
            let result = compute.await;
            if let Some(inner) = inner.upgrade() {
                inner.settle(&key, flight, &result);
            }
            result
        }
        .boxed()
        .shared()
    }

    /// Fresh cached value without computing anything.
    pub fn peek(&self, key: &str) -> Option<V> {
        let slots = self.inner.slots.lock();
        match slots.get(key) {
            Some(Slot::Cached { value, expires_at }) if *expires_at > self.inner.clock.now() => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Remove expired values; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let dropped = drop_expired(&mut self.inner.slots.lock(), now);
        self.inner
            .counters
            .evictions
            .fetch_add(dropped as u64, Ordering::Relaxed);
        dropped
    }

    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            joins: c.joins.load(Ordering::Relaxed),
            computations: c.computations.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
        }
    }
}
