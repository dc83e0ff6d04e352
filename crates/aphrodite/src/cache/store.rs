use crate::cache::clock::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transit store backend error: {0}")]
    Backend(String),
    #[error("Transit store codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// String-valued key/value store with per-entry TTL, the shape of a remote cache.
#[async_trait]
pub trait TransitStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: std::time::Duration,
    ) -> Result<(), StoreError>;
}

const MIN_SWEEP_MARK: usize = 256;

#[derive(Default)]
struct Entries {
    map: HashMap<String, (String, DateTime<Utc>)>,
    sweep_mark: usize,
}

impl Entries {
    /// Drop expired entries once the map has doubled since the last sweep.
    fn sweep_if_due(&mut self, now: DateTime<Utc>) {
        if self.map.len() < self.sweep_mark.max(MIN_SWEEP_MARK) {
            return;
        }
        let before = self.map.len();
        self.map.retain(|_, (_, expires_at)| *expires_at > now);
        let dropped = before - self.map.len();
        self.sweep_mark = self.map.len() * 2;
        if dropped > 0 {
            log::debug!("transit store swept {} expired entries", dropped);
        }
    }
}

/// In-process [`TransitStore`].
pub struct MemoryTransitStore {
    entries: RwLock<Entries>,
    clock: Arc<dyn Clock>,
}

impl MemoryTransitStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransitStore for MemoryTransitStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.map.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }
        self.entries.write().map.remove(key);
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: std::time::Duration,
    ) -> Result<(), StoreError> {
        let ttl = Duration::from_std(ttl).map_err(|e| StoreError::Backend(e.to_string()))?;
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.entries.write();
        entries.sweep_if_due(self.clock.now());
        entries.map.insert(key.to_string(), (value, expires_at));
        Ok(())
    }
}
