use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::grid::Grid;

/// Identity of one single-source fill.
#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct FillKey {
    pub row: usize,
    pub col: usize,
    threshold_bits: u64,
}

impl FillKey {
    pub fn new(row: usize, col: usize, threshold: Option<f64>) -> Self {
        // to_bits is exact for identical floats; the all-ones pattern is a
        // NaN and never a real threshold, so it can stand in for None.
        let threshold_bits = threshold.map_or(u64::MAX, f64::to_bits);
        Self {
            row,
            col,
            threshold_bits,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FillMetrics {
    pub fills_computed: u32,
    pub cache_hits: u32,
}

/// LRU cache of single-source fill grids, shared across planning runs that
/// re-evaluate overlapping transmitter sets.
pub struct FillCache {
    cache: Arc<Mutex<LruCache<FillKey, Arc<Grid>>>>,
    fills_computed: AtomicU32,
    cache_hits: AtomicU32,
}

impl Default for FillCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(100).unwrap())
    }
}

impl FillCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            fills_computed: AtomicU32::new(0),
            cache_hits: AtomicU32::new(0),
        }
    }

    pub fn get(&self, key: &FillKey) -> Option<Arc<Grid>> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(key).cloned()
    }

    pub fn insert(&self, key: FillKey, fill: Arc<Grid>) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(key, fill);
    }

    /// Fetch the fill for `key`, computing and caching it on a miss.
    pub fn get_or_compute(&self, key: FillKey, compute: impl FnOnce() -> Grid) -> Arc<Grid> {
        if let Some(fill) = self.get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return fill;
        }

        let fill = Arc::new(compute());
        self.fills_computed.fetch_add(1, Ordering::Relaxed);
        self.insert(key, fill.clone());
        fill
    }

    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
    }

    pub fn metrics(&self) -> FillMetrics {
        FillMetrics {
            fills_computed: self.fills_computed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}
