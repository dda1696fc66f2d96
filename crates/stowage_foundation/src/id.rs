//! Identifiers for definitions, instances, containers, and slots.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tag::TagId;

/// Instance identifier with generational index for stale reference detection.
///
/// The generation counter increments when an instance index is reused after
/// destruction, allowing detection of stale references to destroyed
/// instances.
///
/// # Layout
/// - `index`: 64-bit index into instance storage
/// - `generation`: 32-bit generation counter
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceId {
    /// Index into instance storage.
    pub index: u64,
    /// Generation counter for stale reference detection.
    pub generation: u32,
}

impl InstanceId {
    /// Creates a new instance ID with the given index and generation.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns a sentinel value representing "no instance".
    ///
    /// This uses `u64::MAX` as the index, which should never be allocated.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            index: u64::MAX,
            generation: 0,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u64::MAX
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "InstanceId(null)")
        } else {
            write!(f, "InstanceId({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Instance(null)")
        } else {
            write!(f, "Instance({})", self.index)
        }
    }
}

/// Definition identifier: a dense index into the definition registry.
///
/// Definitions are registered once at load time and never destroyed, so no
/// generation counter is needed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    /// Returns the raw index of this definition.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefinitionId({})", self.0)
    }
}

/// Container identifier: a dense index into the manager's container table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerId(pub u32);

impl ContainerId {
    /// Returns the raw index of this container.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

/// Address of one slot within a container: the slot kind tag plus the
/// position within that kind's array.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotAddr {
    /// Slot kind tag (e.g. `slot/main`).
    pub kind: TagId,
    /// Position within the kind's array.
    pub index: u32,
}

impl SlotAddr {
    /// Creates a new slot address.
    #[must_use]
    pub const fn new(kind: TagId, index: u32) -> Self {
        Self { kind, index }
    }
}

impl fmt::Debug for SlotAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotAddr({:?}[{}])", self.kind, self.index)
    }
}
