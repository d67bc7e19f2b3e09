//! Operation counters for the probing LRU cache (feature = "metrics").
//!
//! Counters are plain `u64` fields for `&mut self` operations and
//! [`MetricsCell`]s for read paths that only hold `&self`. A point-in-time
//! copy is taken with
//! [`ProbeLruCache::metrics_snapshot`](crate::policy::probe_lru::ProbeLruCache::metrics_snapshot).

use std::cell::Cell;

/// Interior-mutable counter for `&self` read paths.
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

/// Counters recorded by `ProbeLruCache`.
#[derive(Debug, Default)]
pub struct ProbeLruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub shift_steps: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
    pub peek_lru_calls: MetricsCell,
    pub peek_lru_found: MetricsCell,
    pub recency_rank_calls: MetricsCell,
    pub recency_rank_found: MetricsCell,
}

impl ProbeLruMetrics {
    pub fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    pub fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    pub fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    pub fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    pub fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    pub fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    pub fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    pub fn record_shift_step(&mut self) {
        self.shift_steps += 1;
    }

    pub fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    pub fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    pub fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    pub fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }

    pub fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    pub fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }

    pub fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    pub fn record_peek_found(&self) {
        self.peek_found.incr();
    }

    pub fn record_peek_lru_call(&self) {
        self.peek_lru_calls.incr();
    }

    pub fn record_peek_lru_found(&self) {
        self.peek_lru_found.incr();
    }

    pub fn record_recency_rank_call(&self) {
        self.recency_rank_calls.incr();
    }

    pub fn record_recency_rank_found(&self) {
        self.recency_rank_found.incr();
    }

    /// Copies the counters into a plain-data snapshot.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> ProbeLruMetricsSnapshot {
        ProbeLruMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_new: self.insert_new,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            shift_steps: self.shift_steps,
            remove_calls: self.remove_calls,
            remove_found: self.remove_found,
            pop_lru_calls: self.pop_lru_calls,
            pop_lru_found: self.pop_lru_found,
            touch_calls: self.touch_calls,
            touch_found: self.touch_found,
            peek_calls: self.peek_calls.get(),
            peek_found: self.peek_found.get(),
            peek_lru_calls: self.peek_lru_calls.get(),
            peek_lru_found: self.peek_lru_found.get(),
            recency_rank_calls: self.recency_rank_calls.get(),
            recency_rank_found: self.recency_rank_found.get(),
            cache_len,
            capacity,
        }
    }
}

/// Point-in-time copy of [`ProbeLruMetrics`] plus cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub shift_steps: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub peek_calls: u64,
    pub peek_found: u64,
    pub peek_lru_calls: u64,
    pub peek_lru_found: u64,
    pub recency_rank_calls: u64,
    pub recency_rank_found: u64,
    pub cache_len: usize,
    pub capacity: usize,
}
