use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    generation: u64,
}

/// In-memory cache with a fixed time-to-live and optional capacity.
///
/// Expired entries are removed lazily when read. When an insert pushes the
/// cache past its capacity, expired entries go first, then the entries that
/// were set longest ago.
///
/// Time comes from `tokio::time`, so paused-clock tests can advance it.
pub struct TtlCache<V> {
    ttl: Duration,
    capacity: Option<usize>,
    entries: HashMap<String, Entry<V>>,
    /// Keys in insertion order, tagged with the generation they were set at.
    /// Tags that no longer match an entry are skipped.
    order: VecDeque<(String, u64)>,
    next_generation: u64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: Option<usize>) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_generation: 0,
        }
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) >= self.ttl
    }

    /// Get a live value, dropping it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) => self.is_expired(entry, now),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let generation = self.next_generation;
        self.next_generation += 1;

        self.order.push_back((key.clone(), generation));
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                generation,
            },
        );

        if let Some(capacity) = self.capacity {
            if self.entries.len() > capacity {
                self.purge_expired();
            }
            while self.entries.len() > capacity {
                let Some((oldest, generation)) = self.order.pop_front() else {
                    break;
                };
                if self.entries.get(&oldest).map(|e| e.generation) == Some(generation) {
                    self.entries.remove(&oldest);
                    debug!(key = %oldest, "Evicted oldest cache entry");
                }
            }
        }

        if self.order.len() > self.entries.len() * 2 + 16 {
            self.compact_order();
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);
        self.compact_order();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compact_order(&mut self) {
        let entries = &self.entries;
        self.order.retain(|(key, generation)| {
            entries.get(key).map(|e| e.generation) == Some(*generation)
        });
    }
}
