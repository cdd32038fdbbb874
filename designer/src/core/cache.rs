//! Session-scoped result cache with single-flight computation
//!
//! Entries are keyed by snapshot fingerprint. Concurrent `get_or_compute`
//! calls for one fingerprint queue on a per-fingerprint guard, and every
//! waiter re-checks the cache once it holds the guard, so a successful
//! computation is never repeated. Failed computations store nothing.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use shared::FormSnapshot;

use crate::core::fingerprint::fingerprint;
use crate::error::DesignerResult;
use crate::types::{CacheEntry, CacheStats, DesignOutput, Fingerprint, Submission};

/// Default number of entries kept per session
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

type FlightMap = StdMutex<HashMap<Fingerprint, Flight>>;

/// Per-fingerprint permit plus the number of callers holding or queued on it
struct Flight {
    permit: Arc<Mutex<()>>,
    holders: usize,
}

/// Entries plus eviction order, oldest first
struct CacheStore {
    entries: HashMap<Fingerprint, CacheEntry>,
    order: VecDeque<Fingerprint>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl CacheStore {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Insert or overwrite; returns the evicted fingerprint, if any
    fn upsert(&mut self, entry: CacheEntry) -> Option<Fingerprint> {
        let key = entry.fingerprint.clone();
        if self.entries.insert(key.clone(), entry).is_some() {
            self.order.retain(|existing| existing != &key);
        }
        self.order.push_back(key);

        if self.entries.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            self.entries.remove(&oldest);
            return Some(oldest);
        }
        None
    }
}

/// Result cache owned by one design session
pub struct ResultCache {
    store: RwLock<CacheStore>,
    in_flight: FlightMap,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(capacity)),
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    /// Stored entry for a fingerprint; a miss is `None`
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        self.store.read().await.entries.get(fingerprint).cloned()
    }

    /// Idempotent upsert keyed by the entry's fingerprint
    pub async fn put(&self, entry: CacheEntry) {
        let mut store = self.store.write().await;
        if let Some(evicted) = store.upsert(entry) {
            debug!(fingerprint = %evicted.short(), "Evicted oldest cache entry");
        }
    }

    /// Return the cached entry for `snapshot`, or run `compute`, store its
    /// output and return it. Errors from `compute` propagate uncached.
    pub async fn get_or_compute<F, Fut>(&self, snapshot: &FormSnapshot, compute: F) -> DesignerResult<Submission>
    where
        F: FnOnce(FormSnapshot) -> Fut,
        Fut: Future<Output = DesignerResult<DesignOutput>>,
    {
        let key = fingerprint(snapshot);

        if let Some(entry) = self.lookup(&key).await {
            return Ok(Submission { entry, cached: true });
        }

        let _flight = self.enter_flight(&key).await;

        // Another caller may have finished while we waited
        if let Some(entry) = self.lookup(&key).await {
            return Ok(Submission { entry, cached: true });
        }

        self.store.write().await.misses += 1;
        debug!(fingerprint = %key.short(), "Cache miss, computing design");

        let output = compute(snapshot.clone()).await?;
        let entry = CacheEntry::new(key, snapshot.clone(), output);
        self.put(entry.clone()).await;

        Ok(Submission { entry, cached: false })
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        CacheStats {
            hits: store.hits,
            misses: store.misses,
            entries: store.entries.len(),
            capacity: store.capacity,
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of fingerprints with a computation pending or queued
    pub fn in_flight_count(&self) -> usize {
        lock_flights(&self.in_flight).len()
    }

    async fn lookup(&self, key: &Fingerprint) -> Option<CacheEntry> {
        let mut store = self.store.write().await;
        let entry = store.entries.get(key).cloned()?;
        store.hits += 1;
        Some(entry)
    }

    async fn enter_flight(&self, key: &Fingerprint) -> FlightGuard<'_> {
        let permit = {
            let mut flights = lock_flights(&self.in_flight);
            let flight = flights.entry(key.clone()).or_insert_with(|| Flight {
                permit: Arc::new(Mutex::new(())),
                holders: 0,
            });
            flight.holders += 1;
            flight.permit.clone()
        };

        // Guard exists before awaiting so cancellation still cleans up
        let mut guard = FlightGuard {
            in_flight: &self.in_flight,
            fingerprint: key.clone(),
            permit: None,
        };
        guard.permit = Some(permit.lock_owned().await);
        guard
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the per-fingerprint permit; removes the slot when the last holder leaves
struct FlightGuard<'a> {
    in_flight: &'a FlightMap,
    fingerprint: Fingerprint,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        drop(self.permit.take());
        // Holder counts only change under the map lock
        let mut flights = lock_flights(self.in_flight);
        if let Some(flight) = flights.get_mut(&self.fingerprint) {
            flight.holders = flight.holders.saturating_sub(1);
            if flight.holders == 0 {
                flights.remove(&self.fingerprint);
            }
        }
    }
}

fn lock_flights(map: &FlightMap) -> MutexGuard<'_, HashMap<Fingerprint, Flight>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}
