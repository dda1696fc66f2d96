//! Slotted containers for Stowage.
//!
//! A [`Container`] holds fixed-size [`SlotsArray`]s keyed by a slot kind
//! tag, guarded by an [`AccessPolicy`]. The [`Manager`] is the authority
//! facade: all structural mutation (add, remove, transfer, swap) goes
//! through it, raising [`ChangeEvent`]s for observers and dirtying only the
//! touched slot entries for replication. [`ContainerReplica`] and
//! [`LocalsReplica`] reconstruct read-only views on the client side.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod access;
mod container;
mod events;
mod manager;
mod slots;
mod view;

pub use access::{AccessPolicy, Agent, AgentId};
pub use container::{Container, ContainerConfig};
pub use events::{ChangeEvent, EventBuffer, EventBufferStats, EventRecord};
pub use manager::Manager;
pub use slots::SlotsArray;
pub use view::{ContainerDelta, ContainerReplica, LocalsReplica};
