//! # Probing LRU Cache Implementation
//!
//! A bounded cache that keeps every entry directly in a fixed slot array
//! (open addressing with linear probing) and evicts in strict
//! least-recently-used order. Deleted slots are repaired with backward-shift
//! compaction, so the table never carries tombstones and probe chains stay
//! minimal for the cache's whole lifetime.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                       ProbeLruCache<K, V, S>                         │
//!   │                                                                      │
//!   │   slots: Box<[Option<Entry<K, V>>]>   (fixed length = capacity)      │
//!   │                                                                      │
//!   │   index 0   1     2     3     4     5                                │
//!   │        ┌───┬─────┬─────┬─────┬─────┬───┐                             │
//!   │        │   │ B,n2│ A,n1│ C,n3│     │   │   home(A) = 1 (probed to 2) │
//!   │        └───┴─────┴─────┴─────┴─────┴───┘   home(B) = 1               │
//!   │                    ▲                        home(C) = 3              │
//!   │                    │ node ids point into the recency list            │
//!   │                    ▼                                                 │
//!   │   recency: IntrusiveList<usize>  (payload = slot index)              │
//!   │                                                                      │
//!   │   head ──► [3] ◄──► [2] ◄──► [1] ◄── tail                            │
//!   │           (MRU)              (LRU)                                   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One slot is always kept free: `len() <= capacity() - 1` after every
//! operation. The free slot terminates every unsuccessful probe, which is
//! what makes lookups correct without any occupancy metadata.
//!
//! ## Insert Flow
//!
//! ```text
//!   insert(key, value)
//!        │
//!        ▼
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ Would the table be left without a free slot?                         │
//!   │   YES → evict recency tail, backward-shift-compact its slot          │
//!   │   NO  → continue                                                     │
//!   └──────────────────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ Probe forward from hash(key) % capacity:                             │
//!   │   empty slot  → store entry, push to recency head, len += 1          │
//!   │   equal key   → replace stored key + value, promote to head          │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backward-Shift Compaction
//!
//! ```text
//!   remove entry at slot 2 (hole), capacity 8
//!
//!   before:  [ ][ ][X][a][b][ ]...      home(a)=2, home(b)=4
//!
//!   cursor 3: home(a)=2 ∉ (2,3]  → a probed through the hole; move to 2
//!   cursor 4: home(b)=4 ∈ (3,4]  → b sits at home; stays
//!   cursor 5: empty              → stop
//!
//!   after:   [ ][ ][a][ ][b][ ]...      every key still reachable
//! ```
//!
//! An entry moves back into the hole exactly when its home slot lies
//! cyclically at or before the hole, i.e. when its probe chain crossed the
//! freed slot. Entries already reachable without the hole stay put. The
//! entry's recency node travels with it (the node payload is rewritten to the
//! new slot index), so the recency ordering is never disturbed by compaction.
//!
//! ## Methods (CoreCache + MutableCache + LruCacheTrait)
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(capacity)`  | O(n)       | Allocate `capacity` empty slots           |
//! | `insert(k, v)`   | O(1)*      | Insert or update, may evict LRU first     |
//! | `get(&k)`        | O(1)*      | Probe + promote to MRU                    |
//! | `peek(&k)`       | O(1)*      | Probe without promoting                   |
//! | `contains(&k)`   | O(1)*      | Probe without promoting                   |
//! | `remove(&k)`     | O(1)*      | Probe + unlink + compact                  |
//! | `pop_lru()`      | O(1)*      | Evict recency tail + compact              |
//! | `peek_lru()`     | O(1)       | View recency tail                         |
//! | `touch(&k)`      | O(1)*      | Promote to MRU without reading            |
//! | `recency_rank()` | O(n)       | Position in recency order (0 = MRU)       |
//! | `clear()`        | O(n)       | Drop all entries                          |
//!
//! (*) amortized for well-distributed hashes; probe runs lengthen as the
//! table approaches capacity.
//!
//! ## Design Rationale
//!
//! - **Open addressing, no side table**: keys, values and recency links live
//!   in one flat allocation sized once at construction. There is no node
//!   allocation on insert and no rehashing ever.
//! - **Backward shift instead of tombstones**: tombstones would either grow
//!   probe lengths without bound or force periodic rehashing; the shift keeps
//!   every chain exactly as long as repeated insertion would have built it.
//! - **Arena-indexed recency list**: the list stores slot indices and entries
//!   store their node id, so compaction can relocate an entry and fix up the
//!   ordering with one payload write. No raw pointers anywhere.
//!
//! ## Example Usage
//!
//! ```
//! use probecache::policy::probe_lru::ProbeLruCache;
//! use probecache::traits::{CoreCache, LruCacheTrait};
//!
//! // 8 slots: holds up to 7 entries, one slot always stays free
//! let mut cache: ProbeLruCache<String, Vec<u8>> = ProbeLruCache::new(8);
//!
//! cache.insert("terminal".to_string(), vec![1, 2, 3]);
//! cache.insert("browser".to_string(), vec![4, 5, 6]);
//!
//! assert_eq!(cache.get(&"terminal".to_string()), Some(&vec![1, 2, 3]));
//!
//! // "browser" has not been touched since insert, so it is the candidate
//! assert_eq!(cache.peek_lru().map(|(k, _)| k.as_str()), Some("browser"));
//! ```
//!
//! ## Thread Safety
//!
//! `ProbeLruCache` is single-threaded: every operation takes `&mut self` or
//! `&self` and completes synchronously. Callers needing shared access must
//! wrap it themselves.

use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use rustc_hash::FxHasher;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::CreateError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{ProbeLruMetrics, ProbeLruMetricsSnapshot};
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Default hash builder, matching the hashing stack used across the crate.
pub type DefaultHashBuilder = BuildHasherDefault<FxHasher>;

/// An occupied slot: the owned pair plus the entry's recency-list node.
///
/// `node`'s payload in the recency list is this entry's current slot index;
/// compaction rewrites it whenever the entry moves.
#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    node: SlotId,
}

/// Outcome of a linear probe for a key.
enum Probe {
    /// The key was found at this slot index.
    Hit(usize),
    /// The probe reached an empty slot; the key is absent.
    Empty(usize),
}

/// Bounded open-addressing hash table with strict-LRU eviction.
///
/// Owns every accepted `(K, V)` pair; dropped entries (eviction, overwrite,
/// [`remove`](MutableCache::remove), [`clear`](CoreCache::clear), or dropping
/// the cache itself) release their resources exactly once through `Drop`.
///
/// The slot count is fixed at construction. One slot is always kept free, so
/// a cache of capacity `n` holds at most `n - 1` entries, and a capacity-1
/// cache can never hold anything.
pub struct ProbeLruCache<K, V, S = DefaultHashBuilder> {
    slots: Box<[Option<Entry<K, V>>]>,
    recency: IntrusiveList<usize>,
    load: usize,
    hash_builder: S,
    #[cfg(feature = "metrics")]
    metrics: ProbeLruMetrics,
}

impl<K, V> ProbeLruCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache with `capacity` slots and the default hasher.
    ///
    /// A cache of capacity `n` holds at most `n - 1` entries; capacity 1 is
    /// accepted but such a cache can never hold an entry.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) for a
    /// fallible variant.
    ///
    /// # Example
    ///
    /// ```
    /// use probecache::policy::probe_lru::ProbeLruCache;
    /// use probecache::traits::CoreCache;
    ///
    /// let cache: ProbeLruCache<u64, String> = ProbeLruCache::new(64);
    /// assert_eq!(cache.capacity(), 64);
    /// ```
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Fallible counterpart of [`new`](Self::new).
    ///
    /// Returns [`CreateError::ZeroCapacity`] for capacity 0 and
    /// [`CreateError::Alloc`] if slot storage cannot be reserved. No partial
    /// cache exists on failure.
    pub fn try_new(capacity: usize) -> Result<Self, CreateError> {
        Self::try_with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a cache with `capacity` slots and the given hash builder.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            recency: IntrusiveList::with_capacity(capacity),
            load: 0,
            hash_builder,
            #[cfg(feature = "metrics")]
            metrics: ProbeLruMetrics::default(),
        }
    }

    /// Fallible counterpart of [`with_hasher`](Self::with_hasher).
    pub fn try_with_hasher(capacity: usize, hash_builder: S) -> Result<Self, CreateError> {
        if capacity == 0 {
            return Err(CreateError::ZeroCapacity);
        }
        let mut slots: Vec<Option<Entry<K, V>>> = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            recency: IntrusiveList::with_capacity(capacity),
            load: 0,
            hash_builder,
            #[cfg(feature = "metrics")]
            metrics: ProbeLruMetrics::default(),
        })
    }

    /// Read-only lookup without recency promotion.
    ///
    /// Unlike [`get`](CoreCache::get), the entry keeps its position in the
    /// eviction order.
    ///
    /// # Example
    ///
    /// ```
    /// use probecache::policy::probe_lru::ProbeLruCache;
    /// use probecache::traits::CoreCache;
    ///
    /// let mut cache = ProbeLruCache::new(4);
    /// cache.insert(1, "first");
    /// cache.insert(2, "second");
    ///
    /// // Peek does not promote: key 1 is still the eviction candidate
    /// assert_eq!(cache.peek(&1), Some(&"first"));
    /// cache.insert(3, "third");
    /// cache.insert(4, "fourth"); // evicts key 1
    /// assert!(!cache.contains(&1));
    /// ```
    pub fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        match self.probe(key) {
            Probe::Hit(idx) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_peek_found();
                self.slots[idx].as_ref().map(|entry| &entry.value)
            }
            Probe::Empty(_) => None,
        }
    }

    /// Slot index a key's probe sequence starts from.
    #[inline]
    fn home_slot(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) as usize) % self.slots.len()
    }

    /// Linear probe: scan forward from the home slot until the key or an
    /// empty slot is found. An empty slot always exists (one slot is kept
    /// free), so the scan terminates.
    fn probe(&self, key: &K) -> Probe {
        let cap = self.slots.len();
        let mut idx = self.home_slot(key);
        loop {
            match &self.slots[idx] {
                None => return Probe::Empty(idx),
                Some(entry) if entry.key == *key => return Probe::Hit(idx),
                Some(_) => idx = (idx + 1) % cap,
            }
        }
    }

    /// Drops the least recently used entry and repairs its probe chain.
    ///
    /// Returns `false` when there is nothing to evict (empty cache).
    fn evict_lru(&mut self) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let idx = match self.recency.pop_back() {
            Some(idx) => idx,
            None => return false,
        };
        let entry = self.slots[idx]
            .take()
            .expect("recency tail points at empty slot");
        drop(entry);
        self.load -= 1;
        self.compact(idx);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        true
    }

    /// Backward-shift compaction starting at a freed slot.
    ///
    /// Scans forward from the hole. An entry whose home slot lies cyclically
    /// within `(hole, cursor]` is still reachable and stays; any other entry
    /// probed through the hole and moves back into it, its old slot becoming
    /// the new hole. The first empty slot ends the scan. No tombstones.
    fn compact(&mut self, freed: usize) {
        let cap = self.slots.len();
        let mut hole = freed;
        let mut cursor = freed;
        loop {
            cursor = (cursor + 1) % cap;
            let home = match &self.slots[cursor] {
                None => break,
                Some(entry) => self.home_slot(&entry.key),
            };
            let reachable = if hole < cursor {
                home > hole && home <= cursor
            } else {
                home > hole || home <= cursor
            };
            if reachable {
                continue;
            }

            let entry = self.slots[cursor].take().expect("occupied slot missing");
            if let Some(slot_index) = self.recency.get_mut(entry.node) {
                *slot_index = hole;
            }
            self.slots[hole] = Some(entry);
            hole = cursor;

            #[cfg(feature = "metrics")]
            self.metrics.record_shift_step();
        }
    }

    /// Validates internal invariants, for debug builds and tests.
    ///
    /// Checks that one slot is free, that the recency list and the slot array
    /// agree entry-for-entry, and that every occupied slot is reachable by
    /// probing from its key's home slot.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let cap = self.slots.len();
        if self.load >= cap {
            return Err(InvariantError::new(format!(
                "no free slot: load {} >= capacity {}",
                self.load, cap
            )));
        }
        if self.recency.len() != self.load {
            return Err(InvariantError::new(format!(
                "recency length {} != load {}",
                self.recency.len(),
                self.load
            )));
        }

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        if occupied != self.load {
            return Err(InvariantError::new(format!(
                "occupied slots {} != load {}",
                occupied, self.load
            )));
        }

        for (idx, slot) in self.slots.iter().enumerate() {
            let entry = match slot {
                Some(entry) => entry,
                None => continue,
            };

            match self.recency.get(entry.node) {
                Some(&slot_index) if slot_index == idx => {}
                Some(&slot_index) => {
                    return Err(InvariantError::new(format!(
                        "slot {} recency node points at slot {}",
                        idx, slot_index
                    )));
                }
                None => {
                    return Err(InvariantError::new(format!(
                        "slot {} has no recency node",
                        idx
                    )));
                }
            }

            // Probe reachability: the scan from the home slot must reach the
            // entry before any empty slot.
            let mut probe = self.home_slot(&entry.key);
            loop {
                if probe == idx {
                    break;
                }
                if self.slots[probe].is_none() {
                    return Err(InvariantError::new(format!(
                        "slot {} unreachable: probe chain broken at {}",
                        idx, probe
                    )));
                }
                probe = (probe + 1) % cap;
            }
        }

        self.recency.debug_validate_invariants();
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns a point-in-time copy of the operation counters.
    pub fn metrics_snapshot(&self) -> ProbeLruMetricsSnapshot {
        self.metrics.snapshot(self.load, self.slots.len())
    }
}

impl<K, V, S> CoreCache<K, V> for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts or updates, taking ownership of `key` and `value`
    /// unconditionally.
    ///
    /// If storing a new entry would fill the last free slot, the least
    /// recently used entry is evicted *before* probing, so an update landing
    /// on a full table also evicts the LRU tail first. On a capacity-1 cache
    /// nothing can be stored and the pair is dropped.
    ///
    /// When the key is already present, the stored key is replaced by the new
    /// key (the old key is dropped), the old value is returned to the caller,
    /// and the entry is promoted to most recently used.
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        // One slot must always stay free; the recency tail makes room. On a
        // capacity-1 cache there is nothing to evict and nothing to store.
        if self.load + 1 == self.slots.len() && !self.evict_lru() {
            return None;
        }

        match self.probe(&key) {
            Probe::Hit(idx) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();

                let entry = self.slots[idx].as_mut().expect("occupied slot missing");
                entry.key = key;
                let previous = std::mem::replace(&mut entry.value, value);
                let node = entry.node;
                self.recency.move_to_front(node);

                #[cfg(debug_assertions)]
                self.check_invariants().unwrap();

                Some(previous)
            }
            Probe::Empty(idx) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();

                let node = self.recency.push_front(idx);
                self.slots[idx] = Some(Entry { key, value, node });
                self.load += 1;

                #[cfg(debug_assertions)]
                self.check_invariants().unwrap();

                None
            }
        }
    }

    /// Probes for `key`; a hit promotes the entry to most recently used.
    ///
    /// Reaching an empty slot ends the probe with `None` and no side effect.
    /// Never allocates.
    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        let idx = match self.probe(key) {
            Probe::Hit(idx) => idx,
            Probe::Empty(_) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        let node = self.slots[idx].as_ref().expect("occupied slot missing").node;
        self.recency.move_to_front(node);
        self.slots[idx].as_ref().map(|entry| &entry.value)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        matches!(self.probe(key), Probe::Hit(_))
    }

    #[inline]
    fn len(&self) -> usize {
        self.load
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.recency.clear();
        self.load = 0;
    }
}

impl<K, V, S> MutableCache<K, V> for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Removes `key`'s entry, repairing its probe chain by backward shift.
    ///
    /// The removed key is dropped; the value is returned.
    fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let idx = match self.probe(key) {
            Probe::Hit(idx) => idx,
            Probe::Empty(_) => return None,
        };
        let entry = self.slots[idx].take().expect("occupied slot missing");
        self.recency.remove(entry.node);
        self.load -= 1;
        self.compact(idx);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        #[cfg(debug_assertions)]
        self.check_invariants().unwrap();

        Some(entry.value)
    }
}

impl<K, V, S> LruCacheTrait<K, V> for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let idx = self.recency.pop_back()?;
        let entry = self.slots[idx]
            .take()
            .expect("recency tail points at empty slot");
        self.load -= 1;
        self.compact(idx);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();

        #[cfg(debug_assertions)]
        self.check_invariants().unwrap();

        Some((entry.key, entry.value))
    }

    /// Views the eviction candidate without touching recency order.
    fn peek_lru(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_lru_call();

        let idx = *self.recency.back()?;
        self.slots[idx].as_ref().map(|entry| {
            #[cfg(feature = "metrics")]
            self.metrics.record_peek_lru_found();
            (&entry.key, &entry.value)
        })
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let idx = match self.probe(key) {
            Probe::Hit(idx) => idx,
            Probe::Empty(_) => return false,
        };
        let node = self.slots[idx].as_ref().expect("occupied slot missing").node;
        self.recency.move_to_front(node);

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();
        true
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        #[cfg(feature = "metrics")]
        self.metrics.record_recency_rank_call();

        let target = match self.probe(key) {
            Probe::Hit(idx) => idx,
            Probe::Empty(_) => return None,
        };
        let rank = self.recency.iter().position(|&slot| slot == target);

        #[cfg(feature = "metrics")]
        if rank.is_some() {
            self.metrics.record_recency_rank_found();
        }
        rank
    }
}

impl<K, V, S> fmt::Debug for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeLruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V, S> Default for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    /// Creates a cache with a default capacity of 16 slots.
    fn default() -> Self {
        Self::with_hasher(16, S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for ProbeLruCache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
