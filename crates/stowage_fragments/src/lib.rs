//! Fragment composition for Stowage.
//!
//! A [`Definition`] is an immutable, shared archetype: an ordered list of
//! [`Fragment`] behavior modules. An [`Instance`] references a definition and
//! carries per-instance [`LocalData`]. The [`InstanceStore`] owns instance
//! lifecycle: spawn, one-shot initialization, duplication, destruction, and
//! slot-attachment bookkeeping.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod definition;
mod fragment;
mod instance;
mod local_data;

pub use definition::{Definition, DefinitionBuilder, DefinitionRegistry};
pub use fragment::{Fragment, HookContext};
pub use instance::{Attachment, Instance, InstanceStore, Lifecycle};
pub use local_data::LocalData;
