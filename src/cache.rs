use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::models::NewsPayload;

pub const DEFAULT_TTL_SECS: i64 = 4 * 60 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub payload: NewsPayload,
    pub timestamp: DateTime<Utc>,
}

pub struct TtlCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn get(&self, key: &str) -> Option<CachedEntry> {
        self.lock().get(key).cloned()
    }

    pub fn get_fresh(&self, key: &str) -> Option<CachedEntry> {
        let now = self.clock.now();
        self.get(key).filter(|entry| self.is_fresh(entry, now))
    }

    pub fn is_fresh(&self, entry: &CachedEntry, now: DateTime<Utc>) -> bool {
        now - entry.timestamp < self.ttl
    }

    // Timestamps never move backwards, even if the clock does
    pub fn put(&self, key: impl Into<String>, payload: NewsPayload) -> DateTime<Utc> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let key = key.into();

        let timestamp = match entries.get(&key) {
            Some(previous) if previous.timestamp > now => previous.timestamp,
            _ => now,
        };

        entries.insert(key, CachedEntry { payload, timestamp });
        timestamp
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
