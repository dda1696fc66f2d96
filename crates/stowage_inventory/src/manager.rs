//! The authority facade: all structural mutation goes through here.

use std::collections::HashMap;
use std::sync::Arc;

use stowage_foundation::{
    ContainerId, DefinitionId, Error, InstanceId, Result, SlotAddr, TagId, Value,
};
use stowage_fragments::{DefinitionRegistry, InstanceStore};
use stowage_replication::{Cursor, MapDelta};

use crate::access::{AccessPolicy, Agent, AgentId};
use crate::container::{Container, ContainerConfig};
use crate::events::{ChangeEvent, EventBuffer};
use crate::view::ContainerDelta;

/// Owns the definition registry, the instance store, the container table,
/// and the change-event buffer.
///
/// The manager is the single mutation point: guards run before any state
/// changes, so a failed operation is a true no-op on both sides. Clients
/// never mutate; they apply deltas collected here.
#[derive(Debug)]
pub struct Manager {
    registry: Arc<DefinitionRegistry>,
    instances: InstanceStore,
    containers: Vec<Container>,
    events: EventBuffer,
}

impl Manager {
    /// Creates a manager over a sealed definition registry.
    #[must_use]
    pub fn new(registry: Arc<DefinitionRegistry>) -> Self {
        Self {
            registry,
            instances: InstanceStore::new(),
            containers: Vec::new(),
            events: EventBuffer::default_size(),
        }
    }

    /// Creates a manager with a specific event buffer capacity.
    #[must_use]
    pub fn with_event_capacity(registry: Arc<DefinitionRegistry>, capacity: usize) -> Self {
        Self {
            events: EventBuffer::new(capacity),
            ..Self::new(registry)
        }
    }

    /// Returns the shared definition registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    /// Returns the instance store.
    #[must_use]
    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    /// Returns the change-event buffer.
    #[must_use]
    pub fn events(&self) -> &EventBuffer {
        &self.events
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Creates a container from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSlotKind` if the configuration names a kind twice.
    ///
    /// # Panics
    ///
    /// Panics if the number of containers exceeds `u32::MAX`.
    pub fn create_container(
        &mut self,
        owner: AgentId,
        policy: AccessPolicy,
        config: &ContainerConfig,
    ) -> Result<ContainerId> {
        let id = ContainerId(u32::try_from(self.containers.len()).expect("too many containers"));
        self.containers
            .push(Container::new(id, owner, policy, config)?);
        Ok(id)
    }

    /// Gets a container by id.
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` for unknown ids.
    pub fn container(&self, id: ContainerId) -> Result<&Container> {
        self.containers
            .get(id.index() as usize)
            .ok_or_else(|| Error::container_not_found(id))
    }

    /// Gets a container by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` for unknown ids.
    pub fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container> {
        self.containers
            .get_mut(id.index() as usize)
            .ok_or_else(|| Error::container_not_found(id))
    }

    // =========================================================================
    // Instance Lifecycle
    // =========================================================================

    /// Spawns an uninitialized instance of the given definition.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionNotFound` if the definition is not registered.
    pub fn spawn_instance(&mut self, definition: DefinitionId) -> Result<InstanceId> {
        self.instances.spawn(&self.registry, definition)
    }

    /// Runs the one-shot initialization transition.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if the transition already fired.
    pub fn initialize_instance(&mut self, instance: InstanceId) -> Result<()> {
        self.instances.initialize(&self.registry, instance)
    }

    /// Duplicates an instance; the copy is initialized and unslotted.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for dead or stale source ids.
    pub fn duplicate_instance(&mut self, instance: InstanceId) -> Result<InstanceId> {
        self.instances.duplicate(&self.registry, instance)
    }

    /// Destroys an unslotted instance.
    ///
    /// # Errors
    ///
    /// Returns `InstanceAlreadySlotted` while a container references it.
    pub fn destroy_instance(&mut self, instance: InstanceId) -> Result<()> {
        self.instances.destroy(instance)
    }

    /// Sets a local-data value on an instance. Returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for dead or stale ids.
    pub fn set_local(
        &mut self,
        instance: InstanceId,
        tag: TagId,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        Ok(self.instances.get_mut(instance)?.locals_mut().set(tag, value))
    }

    /// Gets a local-data value from an instance.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for dead or stale ids.
    pub fn local(&self, instance: InstanceId, tag: TagId) -> Result<Option<&Value>> {
        Ok(self.instances.get(instance)?.locals().get(tag))
    }

    // =========================================================================
    // Slot Assignment Protocol
    // =========================================================================

    /// Puts an instance into a slot.
    ///
    /// With `index` unset, scans the target array left-to-right for the
    /// first empty slot. All guards run before any mutation: on failure
    /// nothing changed.
    ///
    /// # Errors
    ///
    /// Returns `Uninitialized` or `InstanceAlreadySlotted` for the instance,
    /// `ContainerNotFound`/`UnknownSlotKind` for the target,
    /// `IndexOutOfRange`/`SlotOccupied` for an explicit index, and
    /// `NoEmptySlot` when auto-indexing finds the array full.
    pub fn add(
        &mut self,
        container: ContainerId,
        instance: InstanceId,
        kind: TagId,
        index: Option<u32>,
    ) -> Result<SlotAddr> {
        // Guards: instance state first, then target resolution.
        {
            let inst = self.instances.get(instance)?;
            if !inst.is_initialized() {
                return Err(Error::uninitialized(instance));
            }
            if inst.attachment().is_some() {
                return Err(Error::instance_already_slotted(instance));
            }
        }
        let index = self.resolve_target(container, kind, index)?;
        let addr = SlotAddr::new(kind, index);

        // Mutate.
        self.container_mut(container)?
            .array_mut(kind)?
            .fill(index, instance)?;
        self.instances
            .attach(&self.registry, instance, container, addr)?;
        self.events.push(ChangeEvent::SlotFilled {
            container,
            addr,
            instance,
        });
        Ok(addr)
    }

    /// Empties a slot. Returns the instance that was in it.
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound`/`UnknownSlotKind` for the target and
    /// `IndexOutOfRange`/`SlotEmpty` for the slot.
    pub fn remove(
        &mut self,
        container: ContainerId,
        kind: TagId,
        index: u32,
    ) -> Result<InstanceId> {
        // `clear` runs its bounds and occupancy guards before its single
        // mutation, so a failed remove is a true no-op.
        let instance = self.container_mut(container)?.array_mut(kind)?.clear(index)?;
        self.instances.detach(&self.registry, instance)?;
        let addr = SlotAddr::new(kind, index);
        self.events.push(ChangeEvent::SlotCleared {
            container,
            addr,
            instance,
        });
        Ok(instance)
    }

    /// Moves an instance between two slots in one logical step.
    ///
    /// Both containers' access policies are checked against the agent and
    /// the destination slot resolved before any mutation; if any guard
    /// fails, neither side changes.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when either container refuses the agent, plus
    /// the source (`SlotEmpty`) and destination (`SlotOccupied`,
    /// `NoEmptySlot`, `IndexOutOfRange`) resolution errors.
    pub fn transfer(
        &mut self,
        from_container: ContainerId,
        from: SlotAddr,
        to_container: ContainerId,
        to_kind: TagId,
        to_index: Option<u32>,
        agent: &Agent,
    ) -> Result<SlotAddr> {
        // Guards: access on both sides, then source occupancy, then
        // destination resolution.
        self.check_access(from_container, agent)?;
        self.check_access(to_container, agent)?;

        let instance = self
            .container(from_container)?
            .array(from.kind)?
            .get(from.index)?
            .ok_or_else(|| Error::slot_empty(from.kind, from.index))?;
        let to_index = self.resolve_target(to_container, to_kind, to_index)?;
        let to_addr = SlotAddr::new(to_kind, to_index);

        // Mutate.
        self.container_mut(from_container)?
            .array_mut(from.kind)?
            .clear(from.index)?;
        self.instances.detach(&self.registry, instance)?;
        self.container_mut(to_container)?
            .array_mut(to_kind)?
            .fill(to_index, instance)?;
        self.instances
            .attach(&self.registry, instance, to_container, to_addr)?;
        self.events.push(ChangeEvent::Transferred {
            instance,
            from: (from_container, from),
            to: (to_container, to_addr),
        });
        Ok(to_addr)
    }

    /// Exchanges the instances of two occupied slots in one logical step.
    ///
    /// Both containers' access policies are checked against the agent
    /// before any mutation. Swapping a slot with itself is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when either container refuses the agent and
    /// `SlotEmpty` when either slot holds nothing (move a single instance
    /// with [`transfer`](Manager::transfer) instead).
    pub fn swap(
        &mut self,
        a_container: ContainerId,
        a: SlotAddr,
        b_container: ContainerId,
        b: SlotAddr,
        agent: &Agent,
    ) -> Result<()> {
        self.check_access(a_container, agent)?;
        self.check_access(b_container, agent)?;

        let a_instance = self
            .container(a_container)?
            .array(a.kind)?
            .get(a.index)?
            .ok_or_else(|| Error::slot_empty(a.kind, a.index))?;
        let b_instance = self
            .container(b_container)?
            .array(b.kind)?
            .get(b.index)?
            .ok_or_else(|| Error::slot_empty(b.kind, b.index))?;

        if a_container == b_container && a == b {
            return Ok(());
        }

        // Mutate: empty both, then refill crosswise.
        self.container_mut(a_container)?.array_mut(a.kind)?.clear(a.index)?;
        self.container_mut(b_container)?.array_mut(b.kind)?.clear(b.index)?;
        self.instances.detach(&self.registry, a_instance)?;
        self.instances.detach(&self.registry, b_instance)?;

        self.container_mut(a_container)?
            .array_mut(a.kind)?
            .fill(a.index, b_instance)?;
        self.container_mut(b_container)?
            .array_mut(b.kind)?
            .fill(b.index, a_instance)?;
        self.instances
            .attach(&self.registry, b_instance, a_container, a)?;
        self.instances
            .attach(&self.registry, a_instance, b_container, b)?;

        self.events.push(ChangeEvent::Swapped {
            a: (a_container, a),
            b: (b_container, b),
        });
        Ok(())
    }

    // =========================================================================
    // Replication
    // =========================================================================

    /// Collects per-array deltas for one container.
    ///
    /// `cursors` maps slot kinds to the receiver's last-known position;
    /// unknown kinds get a full picture via [`Cursor::origin`].
    ///
    /// # Errors
    ///
    /// Returns `ContainerNotFound` for unknown ids.
    pub fn collect_container_delta(
        &self,
        container: ContainerId,
        cursors: &HashMap<TagId, Cursor>,
    ) -> Result<ContainerDelta> {
        let target = self.container(container)?;
        let arrays = target
            .arrays()
            .map(|array| {
                let cursor = cursors.get(&array.kind()).copied().unwrap_or_default();
                (array.kind(), array.collect_since(cursor))
            })
            .collect();
        Ok(ContainerDelta { container, arrays })
    }

    /// Collects the local-data delta for one instance.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for dead or stale ids.
    pub fn collect_locals_delta(
        &self,
        instance: InstanceId,
        cursor: Cursor,
    ) -> Result<MapDelta<TagId, Value>> {
        Ok(self.instances.get(instance)?.locals().collect_since(cursor))
    }

    // --- Private helpers ---

    /// Resolves the target slot index for an add or transfer, without
    /// mutating anything.
    fn resolve_target(
        &self,
        container: ContainerId,
        kind: TagId,
        index: Option<u32>,
    ) -> Result<u32> {
        let array = self.container(container)?.array(kind)?;
        match index {
            Some(index) => match array.get(index)? {
                Some(_) => Err(Error::slot_occupied(kind, index)),
                None => Ok(index),
            },
            None => array.first_empty().ok_or_else(|| Error::no_empty_slot(kind)),
        }
    }

    /// Checks a container's access policy against an agent.
    fn check_access(&self, container: ContainerId, agent: &Agent) -> Result<()> {
        let target = self.container(container)?;
        if target.permits(agent) {
            Ok(())
        } else {
            Err(Error::access_denied(container, agent.id.0))
        }
    }
}
