//! Reader-side reconstruction of replicated collections.
//!
//! Replicas hold persistent (`im`) state so observers can take O(1)
//! snapshots. Application is last-writer-wins per entry: a delta whose head
//! is behind the replica's cursor carries superseded values and is dropped.

use std::hash::Hash;

use stowage_foundation::{Error, Result};

use crate::delta::Cursor;
use crate::message::{MapDelta, VecDelta};

/// Receiver-side mirror of a [`DeltaVec`](crate::DeltaVec).
#[derive(Clone, Debug, Default)]
pub struct ReplicaVec<T>
where
    T: Clone,
{
    values: im::Vector<T>,
    cursor: Cursor,
}

impl<T: Clone> ReplicaVec<T> {
    /// Creates an empty replica that has seen nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: im::Vector::new(),
            cursor: Cursor::origin(),
        }
    }

    /// Returns the number of mirrored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been mirrored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gets a mirrored entry by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Returns the replica's current cursor, for the writer's next collect.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Returns an O(1) snapshot of the mirrored state.
    #[must_use]
    pub fn snapshot(&self) -> im::Vector<T> {
        self.values.clone()
    }

    /// Applies a delta.
    ///
    /// Deltas are ordered by (epoch, head); anything at or behind the
    /// replica's cursor carries superseded values and is ignored. A delta
    /// from a newer epoch must carry a full snapshot (structural changes
    /// always ship full).
    ///
    /// # Errors
    ///
    /// Returns `ReplicationGap` for a partial delta from an epoch ahead of
    /// the cursor, and `IndexOutOfRange` when a changed entry lies outside
    /// the mirrored length (a corrupt delta).
    pub fn apply(&mut self, delta: &VecDelta<T>) -> Result<()> {
        if delta.epoch < self.cursor.epoch
            || (delta.epoch == self.cursor.epoch && delta.head <= self.cursor.rep)
        {
            return Ok(());
        }
        if let Some(full) = &delta.full {
            self.values = full.iter().cloned().collect();
        } else if delta.epoch > self.cursor.epoch {
            return Err(Error::replication_gap(self.cursor.epoch, delta.epoch));
        } else {
            for (index, value) in &delta.changed {
                let index = *index as usize;
                if index >= self.values.len() {
                    return Err(Error::index_out_of_range(index, self.values.len()));
                }
                self.values.set(index, value.clone());
            }
        }
        self.cursor = Cursor {
            epoch: delta.epoch,
            rep: delta.head,
        };
        Ok(())
    }
}

/// Receiver-side mirror of a [`DeltaMap`](crate::DeltaMap).
#[derive(Clone, Debug, Default)]
pub struct ReplicaMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    map: im::HashMap<K, V>,
    cursor: Cursor,
}

impl<K: Eq + Hash + Clone, V: Clone> ReplicaMap<K, V> {
    /// Creates an empty replica that has seen nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: im::HashMap::new(),
            cursor: Cursor::origin(),
        }
    }

    /// Returns the number of mirrored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Gets a mirrored value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns the replica's current cursor, for the writer's next collect.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Returns an O(1) snapshot of the mirrored state.
    #[must_use]
    pub fn snapshot(&self) -> im::HashMap<K, V> {
        self.map.clone()
    }

    /// Applies a delta. Upserts insert, tombstones remove.
    ///
    /// Ordering matches [`ReplicaVec::apply`]: stale deltas are ignored, a
    /// newer epoch requires a full snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ReplicationGap` for a partial delta from an epoch ahead of
    /// the cursor.
    pub fn apply(&mut self, delta: &MapDelta<K, V>) -> Result<()> {
        if delta.epoch < self.cursor.epoch
            || (delta.epoch == self.cursor.epoch && delta.head <= self.cursor.rep)
        {
            return Ok(());
        }
        if let Some(full) = &delta.full {
            self.map = full.iter().cloned().collect();
        } else if delta.epoch > self.cursor.epoch {
            return Err(Error::replication_gap(self.cursor.epoch, delta.epoch));
        } else {
            for (key, value) in &delta.changed {
                match value {
                    Some(v) => {
                        self.map.insert(key.clone(), v.clone());
                    }
                    None => {
                        self.map.remove(key);
                    }
                }
            }
        }
        self.cursor = Cursor {
            epoch: delta.epoch,
            rep: delta.head,
        };
        Ok(())
    }
}
