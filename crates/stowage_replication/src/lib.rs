//! Delta-array replication primitives for Stowage.
//!
//! Mutable collections on the authority side carry per-entry replication
//! ids; receivers reconstruct state by applying only the entries whose id
//! advanced past their cursor. This crate provides:
//! - [`DeltaVec`] / [`DeltaMap`] - writer-side collections with dirty tracking
//! - [`VecDelta`] / [`MapDelta`] - serializable delta messages
//! - [`ReplicaVec`] / [`ReplicaMap`] - reader-side reconstruction
//!
//! Removal from a [`DeltaMap`] is a tombstone (a cheap per-entry delta);
//! tombstones are dropped by periodic compaction, which is the only
//! full-resync trigger for maps.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod delta;
mod message;
mod replica;

pub use delta::{CompactionPolicy, Cursor, DeltaMap, DeltaVec};
pub use message::{MapDelta, VecDelta};
pub use replica::{ReplicaMap, ReplicaVec};
