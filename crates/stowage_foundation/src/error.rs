//! Error types for the Stowage system.
//!
//! Uses `thiserror` for ergonomic error definition. Every fallible operation
//! returns a structured [`Error`]; there is no assert-and-continue path.

use thiserror::Error;

use crate::id::{ContainerId, DefinitionId, InstanceId};
use crate::tag::TagId;
use crate::value::ValueKind;

/// Convenience result alias used across all Stowage crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stowage operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a definition not found error.
    #[must_use]
    pub fn definition_not_found(id: DefinitionId) -> Self {
        Self::new(ErrorKind::DefinitionNotFound(id))
    }

    /// Creates a duplicate definition error.
    #[must_use]
    pub fn duplicate_definition(name: TagId) -> Self {
        Self::new(ErrorKind::DuplicateDefinition(name))
    }

    /// Creates a fragment not found error.
    #[must_use]
    pub fn fragment_not_found(definition: DefinitionId, fragment: &'static str) -> Self {
        Self::new(ErrorKind::FragmentNotFound {
            definition,
            fragment,
        })
    }

    /// Creates an instance not found error.
    #[must_use]
    pub fn instance_not_found(id: InstanceId) -> Self {
        Self::new(ErrorKind::InstanceNotFound(id))
    }

    /// Creates a stale instance reference error.
    #[must_use]
    pub fn stale_instance(id: InstanceId) -> Self {
        Self::new(ErrorKind::StaleInstance(id))
    }

    /// Creates an already-initialized error.
    #[must_use]
    pub fn already_initialized(id: InstanceId) -> Self {
        Self::new(ErrorKind::AlreadyInitialized(id))
    }

    /// Creates an uninitialized error.
    #[must_use]
    pub fn uninitialized(id: InstanceId) -> Self {
        Self::new(ErrorKind::Uninitialized(id))
    }

    /// Creates an instance-already-slotted error.
    #[must_use]
    pub fn instance_already_slotted(id: InstanceId) -> Self {
        Self::new(ErrorKind::InstanceAlreadySlotted(id))
    }

    /// Creates a container not found error.
    #[must_use]
    pub fn container_not_found(id: ContainerId) -> Self {
        Self::new(ErrorKind::ContainerNotFound(id))
    }

    /// Creates an unknown slot kind error.
    #[must_use]
    pub fn unknown_slot_kind(kind: TagId) -> Self {
        Self::new(ErrorKind::UnknownSlotKind(kind))
    }

    /// Creates a duplicate slot kind error.
    #[must_use]
    pub fn duplicate_slot_kind(kind: TagId) -> Self {
        Self::new(ErrorKind::DuplicateSlotKind(kind))
    }

    /// Creates a no-empty-slot error.
    #[must_use]
    pub fn no_empty_slot(kind: TagId) -> Self {
        Self::new(ErrorKind::NoEmptySlot(kind))
    }

    /// Creates a slot occupied error.
    #[must_use]
    pub fn slot_occupied(kind: TagId, index: u32) -> Self {
        Self::new(ErrorKind::SlotOccupied { kind, index })
    }

    /// Creates a slot empty error.
    #[must_use]
    pub fn slot_empty(kind: TagId, index: u32) -> Self {
        Self::new(ErrorKind::SlotEmpty { kind, index })
    }

    /// Creates an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: usize, length: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfRange { index, length })
    }

    /// Creates an access denied error.
    #[must_use]
    pub fn access_denied(container: ContainerId, agent: u64) -> Self {
        Self::new(ErrorKind::AccessDenied { container, agent })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ValueKind, actual: ValueKind) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates a replication gap error.
    #[must_use]
    pub fn replication_gap(known_epoch: u64, delta_epoch: u64) -> Self {
        Self::new(ErrorKind::ReplicationGap {
            known_epoch,
            delta_epoch,
        })
    }

    /// Creates an internal error (should not happen).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Definition was not found in the registry.
    #[error("definition not found: {0:?}")]
    DefinitionNotFound(DefinitionId),

    /// A definition with the same name is already registered.
    #[error("duplicate definition: {0:?}")]
    DuplicateDefinition(TagId),

    /// No fragment of the requested concrete type on the definition.
    #[error("fragment not found: {fragment} on definition {definition:?}")]
    FragmentNotFound {
        /// The definition that was scanned.
        definition: DefinitionId,
        /// The concrete fragment type name that was requested.
        fragment: &'static str,
    },

    /// Instance was not found in storage.
    #[error("instance not found: {0:?}")]
    InstanceNotFound(InstanceId),

    /// Instance reference is stale (generation mismatch).
    #[error("stale instance reference: {0:?}")]
    StaleInstance(InstanceId),

    /// Instance was already initialized; the transition fires exactly once.
    #[error("instance already initialized: {0:?}")]
    AlreadyInitialized(InstanceId),

    /// Operation requires an initialized instance.
    #[error("instance not initialized: {0:?}")]
    Uninitialized(InstanceId),

    /// Instance is already referenced by a slot.
    #[error("instance already slotted: {0:?}")]
    InstanceAlreadySlotted(InstanceId),

    /// Container was not found in the manager's table.
    #[error("container not found: {0:?}")]
    ContainerNotFound(ContainerId),

    /// Container has no slot array of the given kind.
    #[error("unknown slot kind: {0:?}")]
    UnknownSlotKind(TagId),

    /// Container configuration names the same slot kind twice.
    #[error("duplicate slot kind: {0:?}")]
    DuplicateSlotKind(TagId),

    /// Auto-indexed add found no empty slot of the given kind.
    #[error("no empty slot of kind {0:?}")]
    NoEmptySlot(TagId),

    /// Target slot already holds an instance.
    #[error("slot occupied: {kind:?}[{index}]")]
    SlotOccupied {
        /// Slot kind tag.
        kind: TagId,
        /// Slot position.
        index: u32,
    },

    /// Target slot holds no instance.
    #[error("slot empty: {kind:?}[{index}]")]
    SlotEmpty {
        /// Slot kind tag.
        kind: TagId,
        /// Slot position.
        index: u32,
    },

    /// Index out of bounds.
    #[error("index out of range: {index} (length {length})")]
    IndexOutOfRange {
        /// The index that was accessed.
        index: usize,
        /// The actual length of the collection.
        length: usize,
    },

    /// Access policy refused the agent.
    #[error("access denied: container {container:?}, agent {agent}")]
    AccessDenied {
        /// The container that refused access.
        container: ContainerId,
        /// The refused agent id.
        agent: u64,
    },

    /// Local-data value has a different kind than requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected value kind.
        expected: ValueKind,
        /// The actual value kind encountered.
        actual: ValueKind,
    },

    /// Delta refers to an epoch the receiver has never seen.
    #[error("replication gap: known epoch {known_epoch}, delta epoch {delta_epoch}")]
    ReplicationGap {
        /// Epoch the receiver last converged on.
        known_epoch: u64,
        /// Epoch carried by the rejected delta.
        delta_epoch: u64,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
