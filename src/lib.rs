//! Stowage - Fragment-composition item system
//!
//! This crate re-exports all layers of the Stowage system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: stowage_inventory    — Slots, containers, access control, events
//! Layer 2: stowage_fragments    — Fragments, definitions, instances, local data
//! Layer 1: stowage_replication  — Delta collections, wire messages, replicas
//! Layer 0: stowage_foundation   — Core types (Value, TagId, InstanceId, Error)
//! ```

pub use stowage_foundation as foundation;
pub use stowage_fragments as fragments;
pub use stowage_inventory as inventory;
pub use stowage_replication as replication;
