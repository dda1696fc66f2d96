//! Serializable delta messages.
//!
//! A delta carries either the changed entries since a receiver's cursor or,
//! after a structural change, a full snapshot. Messages are plain data:
//! transport and framing are the caller's concern.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Delta for a [`DeltaVec`](crate::DeltaVec).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VecDelta<T> {
    /// Structural epoch this delta was collected at.
    pub epoch: u64,
    /// Highest replication id at collect time.
    pub head: u64,
    /// Full snapshot, present when the receiver's epoch was stale.
    pub full: Option<Vec<T>>,
    /// Changed entries as (index, value) pairs.
    pub changed: Vec<(u32, T)>,
}

impl<T> VecDelta<T> {
    /// Returns true if this delta carries a full snapshot.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full.is_some()
    }

    /// Returns true if this delta carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_none() && self.changed.is_empty()
    }
}

/// Delta for a [`DeltaMap`](crate::DeltaMap).
///
/// A `None` value in `changed` is a tombstone: the key was removed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapDelta<K, V> {
    /// Structural epoch this delta was collected at.
    pub epoch: u64,
    /// Highest replication id at collect time.
    pub head: u64,
    /// Full snapshot of live entries, present when the receiver's epoch was
    /// stale.
    pub full: Option<Vec<(K, V)>>,
    /// Changed entries: upserts (`Some`) and tombstones (`None`).
    pub changed: Vec<(K, Option<V>)>,
}

impl<K, V> MapDelta<K, V> {
    /// Returns true if this delta carries a full snapshot.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full.is_some()
    }

    /// Returns true if this delta carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_none() && self.changed.is_empty()
    }
}
