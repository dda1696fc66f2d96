//! Writer-side collections with per-entry dirty tracking.

// Slot arrays and local-data maps stay far below u32::MAX entries.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::hash::Hash;

use stowage_foundation::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::message::{MapDelta, VecDelta};

/// A receiver's last-known position against one writer-side collection.
///
/// `epoch` identifies the structural generation of the collection; `rep` is
/// the highest replication id the receiver has applied within that epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cursor {
    /// Structural generation last converged on.
    pub epoch: u64,
    /// Highest replication id applied within that epoch.
    pub rep: u64,
}

impl Cursor {
    /// The position of a receiver that has seen nothing yet.
    #[must_use]
    pub const fn origin() -> Self {
        Self { epoch: 0, rep: 0 }
    }
}

/// One tracked entry: the value plus the replication id of its last change.
#[derive(Clone, Debug)]
struct Entry<T> {
    value: T,
    rep: u64,
}

/// An array whose entries carry monotonically increasing replication ids.
///
/// `set` marks only the touched entry dirty. Structural mutation (`push`,
/// `remove`) bumps the epoch and forces a full resync on the next collect;
/// callers holding fixed-size arrays never pay that cost.
///
/// Epochs start at 1, so [`Cursor::origin`] never matches and a fresh
/// receiver's first delta is always a full snapshot.
#[derive(Clone, Debug)]
pub struct DeltaVec<T> {
    entries: Vec<Entry<T>>,
    /// Highest replication id assigned.
    head: u64,
    /// Bumped on every structural change.
    epoch: u64,
}

impl<T: Clone> DeltaVec<T> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            head: 0,
            epoch: 1,
        }
    }

    /// Creates an array of `len` copies of `value`.
    #[must_use]
    pub fn filled(len: usize, value: T) -> Self {
        let entries = (0..len)
            .map(|_| Entry {
                value: value.clone(),
                rep: 0,
            })
            .collect();
        Self {
            entries,
            head: 0,
            epoch: 1,
        }
    }

    /// Creates an array from the given values.
    #[must_use]
    pub fn from_values(values: Vec<T>) -> Self {
        let entries = values
            .into_iter()
            .map(|value| Entry { value, rep: 0 })
            .collect();
        Self {
            entries,
            head: 0,
            epoch: 1,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets an entry by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.value)
    }

    /// Replaces the entry at `index`, marking only that entry dirty.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| Error::index_out_of_range(index, len))?;
        self.head += 1;
        entry.value = value;
        entry.rep = self.head;
        Ok(())
    }

    /// Appends an entry. Structural: bumps the epoch, forcing a full resync.
    pub fn push(&mut self, value: T) {
        self.head += 1;
        self.entries.push(Entry {
            value,
            rep: self.head,
        });
        self.epoch += 1;
    }

    /// Removes the entry at `index`, shifting later entries. Structural:
    /// bumps the epoch, forcing a full resync.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.entries.len() {
            return Err(Error::index_out_of_range(index, self.entries.len()));
        }
        let entry = self.entries.remove(index);
        self.epoch += 1;
        Ok(entry.value)
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Returns the highest replication id assigned.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Returns the current structural epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Collects the delta a receiver at `cursor` needs to converge.
    ///
    /// A cursor from another epoch gets a full snapshot; otherwise only
    /// entries whose replication id advanced past `cursor.rep` are included.
    #[must_use]
    pub fn collect_since(&self, cursor: Cursor) -> VecDelta<T> {
        if cursor.epoch != self.epoch {
            return VecDelta {
                epoch: self.epoch,
                head: self.head,
                full: Some(self.iter().cloned().collect()),
                changed: Vec::new(),
            };
        }
        let changed = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.rep > cursor.rep)
            .map(|(i, e)| (i as u32, e.value.clone()))
            .collect();
        VecDelta {
            epoch: self.epoch,
            head: self.head,
            full: None,
            changed,
        }
    }
}

impl<T: Clone> Default for DeltaVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// When a [`DeltaMap`] compacts its tombstones.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompactionPolicy {
    /// Tombstone count above which compaction runs automatically.
    pub max_tombstones: usize,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self { max_tombstones: 64 }
    }
}

/// One tracked map entry. `None` is a tombstone: the key was removed but the
/// removal has not yet been compacted away.
#[derive(Clone, Debug)]
struct MapEntry<V> {
    value: Option<V>,
    rep: u64,
}

/// A keyed collection with per-entry dirty tracking and tombstoned removal.
///
/// Removal writes a tombstone, a cheap per-entry delta, instead of forcing
/// an immediate full resync. Tombstones are dropped by [`compact`], which
/// bumps the epoch; one full resync amortizes many removals.
///
/// [`compact`]: DeltaMap::compact
#[derive(Clone, Debug)]
pub struct DeltaMap<K, V> {
    entries: HashMap<K, MapEntry<V>>,
    head: u64,
    epoch: u64,
    live: usize,
    tombstones: usize,
    policy: CompactionPolicy,
}

impl<K: Eq + Hash + Clone, V: Clone> DeltaMap<K, V> {
    /// Creates an empty map with the default compaction policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CompactionPolicy::default())
    }

    /// Creates an empty map with the given compaction policy.
    ///
    /// Epochs start at 1, so [`Cursor::origin`] never matches and a fresh
    /// receiver's first delta is always a full snapshot.
    #[must_use]
    pub fn with_policy(policy: CompactionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            head: 0,
            epoch: 1,
            live: 0,
            tombstones: 0,
            policy,
        }
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Gets a live value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).and_then(|e| e.value.as_ref())
    }

    /// Returns true if the map holds a live entry for the key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces the value for a key, marking only that entry
    /// dirty. Returns the previous live value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.head += 1;
        let rep = self.head;
        match self.entries.insert(
            key,
            MapEntry {
                value: Some(value),
                rep,
            },
        ) {
            Some(MapEntry { value: Some(v), .. }) => Some(v),
            Some(MapEntry { value: None, .. }) => {
                // Key resurrected over a tombstone.
                self.tombstones -= 1;
                self.live += 1;
                None
            }
            None => {
                self.live += 1;
                None
            }
        }
    }

    /// Removes a key, writing a tombstone. Returns the removed value.
    ///
    /// Removing an absent or already-removed key is a no-op. Compaction runs
    /// automatically once the tombstone count exceeds the policy threshold.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.get_mut(key)?;
        let value = entry.value.take()?;
        self.head += 1;
        entry.rep = self.head;
        self.live -= 1;
        self.tombstones += 1;
        if self.tombstones > self.policy.max_tombstones {
            self.compact();
        }
        Some(value)
    }

    /// Drops all tombstones and bumps the epoch.
    ///
    /// Receivers take one full resync after this; until then every removal
    /// stays a cheap per-entry delta.
    pub fn compact(&mut self) {
        if self.tombstones == 0 {
            return;
        }
        self.entries.retain(|_, e| e.value.is_some());
        self.tombstones = 0;
        self.epoch += 1;
    }

    /// Returns an iterator over live key-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .filter_map(|(k, e)| e.value.as_ref().map(|v| (k, v)))
    }

    /// Returns the highest replication id assigned.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Returns the current structural epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the number of uncompacted tombstones.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    /// Collects the delta a receiver at `cursor` needs to converge.
    ///
    /// A cursor from another epoch gets a full snapshot of the live entries;
    /// otherwise upserts and tombstones whose replication id advanced past
    /// `cursor.rep` are included.
    #[must_use]
    pub fn collect_since(&self, cursor: Cursor) -> MapDelta<K, V> {
        if cursor.epoch != self.epoch {
            return MapDelta {
                epoch: self.epoch,
                head: self.head,
                full: Some(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
                changed: Vec::new(),
            };
        }
        let changed = self
            .entries
            .iter()
            .filter(|(_, e)| e.rep > cursor.rep)
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect();
        MapDelta {
            epoch: self.epoch,
            head: self.head,
            full: None,
            changed,
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for DeltaMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
