//! Fixed-size arrays of slots, one per slot kind.

// Slot arrays stay far below u32::MAX entries.
#![allow(clippy::cast_possible_truncation)]

use stowage_foundation::{Error, InstanceId, Result, TagId};
use stowage_replication::{Cursor, DeltaVec, VecDelta};

/// A fixed-length array of slots of one kind.
///
/// Each slot holds zero or one instance reference. Length is fixed at
/// construction and never changes; there is deliberately no push or remove
/// surface, so the backing delta array never pays a structural resync.
#[derive(Clone, Debug)]
pub struct SlotsArray {
    kind: TagId,
    slots: DeltaVec<Option<InstanceId>>,
}

impl SlotsArray {
    /// Creates an array of `len` empty slots of the given kind.
    #[must_use]
    pub fn new(kind: TagId, len: u32) -> Self {
        Self {
            kind,
            slots: DeltaVec::filled(len as usize, None),
        }
    }

    /// Returns the slot kind tag.
    #[must_use]
    pub fn kind(&self) -> TagId {
        self.kind
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Returns true if the array has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the instance in the slot, or `None` for an empty slot.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` is out of bounds.
    pub fn get(&self, index: u32) -> Result<Option<InstanceId>> {
        self.slots
            .get(index as usize)
            .copied()
            .ok_or_else(|| Error::index_out_of_range(index as usize, self.slots.len()))
    }

    /// Scans left-to-right for the first empty slot.
    #[must_use]
    pub fn first_empty(&self) -> Option<u32> {
        self.slots
            .iter()
            .position(Option::is_none)
            .map(|i| i as u32)
    }

    /// Puts an instance into an empty slot, dirtying only that entry.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` or `SlotOccupied`.
    pub fn fill(&mut self, index: u32, instance: InstanceId) -> Result<()> {
        match self.get(index)? {
            Some(_) => Err(Error::slot_occupied(self.kind, index)),
            None => self.slots.set(index as usize, Some(instance)),
        }
    }

    /// Empties a slot, dirtying only that entry. Returns the instance that
    /// was in it.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` or `SlotEmpty`.
    pub fn clear(&mut self, index: u32) -> Result<InstanceId> {
        match self.get(index)? {
            None => Err(Error::slot_empty(self.kind, index)),
            Some(instance) => {
                self.slots.set(index as usize, None)?;
                Ok(instance)
            }
        }
    }

    /// Iterates over occupied slots as (index, instance) pairs.
    pub fn occupied(&self) -> impl Iterator<Item = (u32, InstanceId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|id| (i as u32, id)))
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn occupied_count(&self) -> u32 {
        self.occupied().count() as u32
    }

    /// Collects the delta a receiver at `cursor` needs to converge.
    #[must_use]
    pub fn collect_since(&self, cursor: Cursor) -> VecDelta<Option<InstanceId>> {
        self.slots.collect_since(cursor)
    }
}
