//! # Context Cache
//! Time-bounded memoization of retrieval results keyed by query.
//!
//! Entries expire after an absolute TTL (no sliding refresh) and the map is
//! capacity-bounded: when full, the entry with the oldest creation time is
//! evicted first. One coarse `Mutex` guards the whole map; throughput here is
//! a handful of lookups per user action.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use metrics::{counter, gauge};

use crate::retrieval::types::{Query, ResultSet};

/// Cache key: normalized query text, lookback, cap, and a coarse hour bucket
/// so entries age out along with the data they describe.
pub fn cache_key(query: &Query, now_unix: u64) -> String {
    let lookback_secs = query.lookback.map(|d| d.as_secs()).unwrap_or(0);
    let cap = query.max_results.unwrap_or(0);
    let bucket = now_unix / 3600;
    format!(
        "{}|{}|{}|{}",
        crate::retrieval::normalize_query(&query.text),
        lookback_secs,
        cap,
        bucket
    )
}

/// Current UNIX time in seconds.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}

#[derive(Debug)]
struct Entry {
    set: ResultSet,
    inserted: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.inserted.elapsed() > self.ttl
    }
}

#[derive(Debug)]
struct Inner {
    map: HashMap<String, Entry>,
    /// Keys in insertion order; front is the oldest entry.
    order: VecDeque<String>,
}

/// Thread-safe bounded TTL cache over `ResultSet`s.
#[derive(Debug)]
pub struct ContextCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl ContextCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Look up a fresh entry. Expired entries are removed and never returned.
    pub fn get(&self, key: &str) -> Option<ResultSet> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");

        let fresh = match inner.map.get(key) {
            Some(e) if !e.is_expired() => true,
            Some(_) => false,
            None => {
                counter!("retrieval_cache_misses_total").increment(1);
                return None;
            }
        };

        if fresh {
            counter!("retrieval_cache_hits_total").increment(1);
            return inner.map.get(key).map(|e| e.set.clone());
        }

        inner.map.remove(key);
        inner.order.retain(|k| k != key);
        gauge!("retrieval_cache_entries").set(inner.map.len() as f64);
        counter!("retrieval_cache_misses_total").increment(1);
        None
    }

    /// Insert or atomically replace an entry. A replaced entry gets a fresh
    /// creation time and moves to the back of the eviction order.
    pub fn put(&self, key: &str, set: ResultSet) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");

        if inner.map.contains_key(key) {
            inner.order.retain(|k| k != key);
        } else if inner.map.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
                counter!("retrieval_cache_evictions_total").increment(1);
            }
        }

        inner.map.insert(
            key.to_string(),
            Entry {
                set,
                inserted: Instant::now(),
                ttl: self.ttl,
            },
        );
        inner.order.push_back(key.to_string());
        gauge!("retrieval_cache_entries").set(inner.map.len() as f64);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
