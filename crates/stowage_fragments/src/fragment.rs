//! The fragment trait and its lifecycle hooks.

use std::any::Any;
use std::fmt;

use stowage_foundation::{InstanceId, SlotAddr};

use crate::local_data::LocalData;

/// Mutable context handed to fragment hooks.
///
/// A hook can reach the instance's local data and nothing else: the
/// definition a fragment belongs to is structurally out of reach, so
/// definitions stay immutable no matter what a hook does.
pub struct HookContext<'a> {
    /// Local data of the instance the hook fires for.
    pub locals: &'a mut LocalData,
}

impl<'a> HookContext<'a> {
    /// Creates a context over the given instance locals.
    #[must_use]
    pub fn new(locals: &'a mut LocalData) -> Self {
        Self { locals }
    }
}

/// A polymorphic behavior unit attached to a definition.
///
/// Fragments hold no per-instance state; anything an instance needs lives in
/// its [`LocalData`] and is seeded through the lifecycle hooks. All hooks
/// default to no-ops, so a fragment implements only the ones it cares about.
///
/// Hooks fire in definition order: the order fragments were added to the
/// [`DefinitionBuilder`](crate::DefinitionBuilder).
pub trait Fragment: Any + Send + Sync {
    /// Short name for diagnostics and event records.
    fn name(&self) -> &'static str;

    /// Fires once when an instance of the owning definition is created.
    fn on_instance_created(&self, _ctx: &mut HookContext<'_>, _instance: InstanceId) {}

    /// Fires once when the instance transitions to initialized.
    fn on_instance_initialized(&self, _ctx: &mut HookContext<'_>, _instance: InstanceId) {}

    /// Fires after the instance lands in a slot.
    fn on_added_to_slot(&self, _ctx: &mut HookContext<'_>, _instance: InstanceId, _slot: SlotAddr) {
    }

    /// Fires after the instance leaves a slot.
    fn on_removed_from_slot(
        &self,
        _ctx: &mut HookContext<'_>,
        _instance: InstanceId,
        _slot: SlotAddr,
    ) {
    }

    /// Upcast for concrete-type lookup on a definition.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fragment {}>", self.name())
    }
}
