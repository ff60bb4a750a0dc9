use crate::domain::ports::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
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
        if let Ok(mut now) = self.now.lock() {
            let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
            *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Entries plus an index ordered by expiry; both always hold the same keys.
struct Entries<V> {
    map: HashMap<String, CacheEntry<V>>,
    by_expiry: BTreeSet<(DateTime<Utc>, String)>,
}

impl<V> Entries<V> {
    fn remove(&mut self, key: &str) {
        if let Some(entry) = self.map.remove(key) {
            self.by_expiry.remove(&(entry.expires_at, key.to_string()));
        }
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        while let Some((expires_at, _)) = self.by_expiry.first() {
            if *expires_at > now {
                break;
            }
            if let Some((_, key)) = self.by_expiry.pop_first() {
                self.map.remove(&key);
            }
        }
    }

    fn evict_closest_to_expiry(&mut self) {
        if let Some((_, key)) = self.by_expiry.pop_first() {
            self.map.remove(&key);
        }
    }
}

/// Bounded string-keyed map whose entries expire a fixed time after they are written.
///
/// Entries are replaced wholesale, never updated in place. When full, expired entries are purged
/// first and then the entry closest to expiry is evicted.
pub struct TtlCache<V> {
    entries: RwLock<Entries<V>>,
    ttl: TimeDelta,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                by_expiry: BTreeSet::new(),
            }),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity: capacity.max(1),
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        entries
            .map
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: String, value: V) {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!("Cache lock poisoned, dropping entry");
            return;
        };

        if entries.map.contains_key(&key) {
            entries.remove(&key);
        } else if entries.map.len() >= self.capacity {
            entries.purge_expired(now);
            if entries.map.len() >= self.capacity {
                entries.evict_closest_to_expiry();
            }
        }

        entries.by_expiry.insert((expires_at, key.clone()));
        entries.map.insert(key, CacheEntry { value, expires_at });
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
