//! Client-side reconstruction of containers and local data.
//!
//! Replicas are read-only: the authority collects deltas, the client
//! applies them. Replica state lives in persistent structures, so observers
//! can take O(1) snapshots that stay stable while new deltas arrive.

use std::collections::HashMap;

use stowage_foundation::{ContainerId, Error, InstanceId, Result, TagId, Value};
use stowage_replication::{Cursor, MapDelta, ReplicaMap, ReplicaVec, VecDelta};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-array deltas for one container, collected by the authority.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerDelta {
    /// The container the deltas belong to.
    pub container: ContainerId,
    /// One delta per slot array, keyed by kind.
    pub arrays: Vec<(TagId, VecDelta<Option<InstanceId>>)>,
}

impl ContainerDelta {
    /// Returns true if no array carries any change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.iter().all(|(_, delta)| delta.is_empty())
    }
}

/// Read-only mirror of one container's slot arrays.
#[derive(Clone, Debug)]
pub struct ContainerReplica {
    container: ContainerId,
    arrays: HashMap<TagId, ReplicaVec<Option<InstanceId>>>,
}

impl ContainerReplica {
    /// Creates a replica for the given container that has seen nothing yet.
    #[must_use]
    pub fn new(container: ContainerId) -> Self {
        Self {
            container,
            arrays: HashMap::new(),
        }
    }

    /// Returns the container this replica mirrors.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Returns per-kind cursors for the authority's next collect.
    #[must_use]
    pub fn cursors(&self) -> HashMap<TagId, Cursor> {
        self.arrays
            .iter()
            .map(|(kind, replica)| (*kind, replica.cursor()))
            .collect()
    }

    /// Applies a container delta, creating arrays the replica has not seen.
    ///
    /// # Errors
    ///
    /// Returns an internal error for a delta addressed to another container,
    /// plus the per-array application errors of the replication layer.
    pub fn apply(&mut self, delta: &ContainerDelta) -> Result<()> {
        if delta.container != self.container {
            return Err(Error::internal(format!(
                "delta for {:?} applied to replica of {:?}",
                delta.container, self.container
            )));
        }
        for (kind, array_delta) in &delta.arrays {
            self.arrays
                .entry(*kind)
                .or_insert_with(ReplicaVec::new)
                .apply(array_delta)?;
        }
        Ok(())
    }

    /// Returns the instance in a mirrored slot.
    ///
    /// Flattened: `None` for an empty slot, an unknown kind, or an index the
    /// replica has not mirrored.
    #[must_use]
    pub fn slot(&self, kind: TagId, index: u32) -> Option<InstanceId> {
        self.arrays
            .get(&kind)?
            .get(index as usize)
            .copied()
            .flatten()
    }

    /// Returns the mirrored length of one slot array.
    #[must_use]
    pub fn array_len(&self, kind: TagId) -> Option<usize> {
        self.arrays.get(&kind).map(ReplicaVec::len)
    }

    /// Returns the number of occupied slots of one kind.
    #[must_use]
    pub fn occupied_count(&self, kind: TagId) -> usize {
        self.arrays.get(&kind).map_or(0, |replica| {
            replica.snapshot().iter().filter(|s| s.is_some()).count()
        })
    }

    /// Iterates over the mirrored slot kinds.
    pub fn kinds(&self) -> impl Iterator<Item = TagId> + '_ {
        self.arrays.keys().copied()
    }
}

/// Read-only mirror of one instance's local data.
#[derive(Clone, Debug)]
pub struct LocalsReplica {
    instance: InstanceId,
    entries: ReplicaMap<TagId, Value>,
}

impl LocalsReplica {
    /// Creates a replica for the given instance that has seen nothing yet.
    #[must_use]
    pub fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            entries: ReplicaMap::new(),
        }
    }

    /// Returns the instance this replica mirrors.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Returns the cursor for the authority's next collect.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.entries.cursor()
    }

    /// Applies a local-data delta.
    ///
    /// # Errors
    ///
    /// Returns the application errors of the replication layer.
    pub fn apply(&mut self, delta: &MapDelta<TagId, Value>) -> Result<()> {
        self.entries.apply(delta)
    }

    /// Gets a mirrored value by tag.
    #[must_use]
    pub fn get(&self, tag: TagId) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Returns the number of mirrored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an O(1) snapshot of the mirrored entries.
    #[must_use]
    pub fn snapshot(&self) -> im::HashMap<TagId, Value> {
        self.entries.snapshot()
    }
}
