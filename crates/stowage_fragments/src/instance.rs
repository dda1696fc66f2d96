//! Instance lifecycle management with generational indices.
//!
//! The `InstanceStore` allocates instances, tracks generations to detect
//! stale references, drives the one-shot initialization transition, and
//! records slot attachments so no instance is ever referenced by two slots.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use stowage_foundation::{ContainerId, DefinitionId, Error, InstanceId, Result, SlotAddr};

use crate::definition::{Definition, DefinitionRegistry};
use crate::fragment::HookContext;
use crate::local_data::LocalData;

/// Lifecycle state of an instance.
///
/// The transition fires exactly once; re-initialization is a structured
/// error, not a recoverable condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created but not yet initialized.
    Uninitialized,
    /// Initialization hooks have run.
    Initialized,
}

/// Where an instance currently sits, if anywhere.
///
/// At most one attachment exists per instance: a slot's reference is never
/// shared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The container holding the instance.
    pub container: ContainerId,
    /// The slot within that container.
    pub addr: SlotAddr,
}

/// A per-entity runtime object: definition reference plus local data.
#[derive(Debug)]
pub struct Instance {
    id: InstanceId,
    definition: DefinitionId,
    lifecycle: Lifecycle,
    locals: LocalData,
    attachment: Option<Attachment>,
}

impl Instance {
    /// Returns this instance's id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the definition this instance references.
    #[must_use]
    pub fn definition(&self) -> DefinitionId {
        self.definition
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns true once initialization has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized
    }

    /// Returns the instance's local data.
    #[must_use]
    pub fn locals(&self) -> &LocalData {
        &self.locals
    }

    /// Returns the instance's local data mutably.
    pub fn locals_mut(&mut self) -> &mut LocalData {
        &mut self.locals
    }

    /// Returns the current slot attachment, if any.
    #[must_use]
    pub fn attachment(&self) -> Option<Attachment> {
        self.attachment
    }
}

/// Manages instance allocation, generations, and lifecycle transitions.
///
/// Instances are allocated from a free list when available, otherwise new
/// indices are allocated. When an instance is destroyed, its index is added
/// to the free list and its generation is incremented.
#[derive(Debug, Default)]
pub struct InstanceStore {
    /// Instance records; `None` marks a free index.
    records: Vec<Option<Instance>>,
    /// Generation counter for each index.
    /// Even generations are free, odd generations are alive.
    generations: Vec<u32>,
    /// Free list of indices available for reuse.
    free_list: Vec<u64>,
    /// Count of live instances.
    live_count: usize,
}

impl InstanceStore {
    /// Creates a new empty instance store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new, uninitialized instance of the given definition.
    ///
    /// Fires `on_instance_created` on every fragment in definition order.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionNotFound` if the definition is not registered.
    pub fn spawn(
        &mut self,
        registry: &DefinitionRegistry,
        definition: DefinitionId,
    ) -> Result<InstanceId> {
        let def = Arc::clone(
            registry
                .get(definition)
                .ok_or_else(|| Error::definition_not_found(definition))?,
        );

        let id = self.allocate();
        let instance = Instance {
            id,
            definition,
            lifecycle: Lifecycle::Uninitialized,
            locals: LocalData::new(),
            attachment: None,
        };
        self.records[id.index as usize] = Some(instance);

        self.fire(&def, id, |fragment, ctx| {
            fragment.on_instance_created(ctx, id);
        })?;

        Ok(id)
    }

    /// Transitions an instance to initialized. Fires exactly once.
    ///
    /// Fires `on_instance_initialized` on every fragment in definition order.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if the transition already fired, and the
    /// usual lookup errors for dead or stale ids.
    pub fn initialize(&mut self, registry: &DefinitionRegistry, id: InstanceId) -> Result<()> {
        let instance = self.get_mut(id)?;
        if instance.is_initialized() {
            return Err(Error::already_initialized(id));
        }
        instance.lifecycle = Lifecycle::Initialized;

        let def = self.definition_of(registry, id)?;
        self.fire(&def, id, |fragment, ctx| {
            fragment.on_instance_initialized(ctx, id);
        })?;

        Ok(())
    }

    /// Duplicates an instance: copies its local data values and initializes
    /// the copy against the same definition.
    ///
    /// The copy goes through the full lifecycle (created hooks, the local
    /// data value-copy, then initialization hooks), so replicas of the copy
    /// receive a complete picture rather than the source's delta history.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for dead or stale source ids.
    pub fn duplicate(
        &mut self,
        registry: &DefinitionRegistry,
        source: InstanceId,
    ) -> Result<InstanceId> {
        let (definition, locals) = {
            let instance = self.get(source)?;
            (instance.definition, instance.locals.value_copy())
        };

        let copy = self.spawn(registry, definition)?;
        self.get_mut(copy)?.locals = locals;
        self.initialize(registry, copy)?;
        Ok(copy)
    }

    /// Destroys an instance.
    ///
    /// # Errors
    ///
    /// Returns `InstanceAlreadySlotted` while a container still references
    /// the instance: the caller must remove it from its slot first.
    pub fn destroy(&mut self, id: InstanceId) -> Result<()> {
        let instance = self.get(id)?;
        if instance.attachment.is_some() {
            return Err(Error::instance_already_slotted(id));
        }

        let idx = id.index as usize;
        self.records[idx] = None;
        // Increment generation (was odd/alive, now even/free)
        self.generations[idx] += 1;
        self.free_list.push(id.index);
        self.live_count -= 1;

        Ok(())
    }

    /// Records that a container slot now references this instance and fires
    /// `on_added_to_slot`.
    ///
    /// # Errors
    ///
    /// Returns `Uninitialized` for instances that have not initialized and
    /// `InstanceAlreadySlotted` if some slot already references the instance.
    pub fn attach(
        &mut self,
        registry: &DefinitionRegistry,
        id: InstanceId,
        container: ContainerId,
        addr: SlotAddr,
    ) -> Result<()> {
        let instance = self.get_mut(id)?;
        if !instance.is_initialized() {
            return Err(Error::uninitialized(id));
        }
        if instance.attachment.is_some() {
            return Err(Error::instance_already_slotted(id));
        }
        instance.attachment = Some(Attachment { container, addr });

        let def = self.definition_of(registry, id)?;
        self.fire(&def, id, |fragment, ctx| {
            fragment.on_added_to_slot(ctx, id, addr);
        })?;

        Ok(())
    }

    /// Clears the slot attachment and fires `on_removed_from_slot`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the instance is not attached; containers
    /// only detach instances they hold.
    pub fn detach(&mut self, registry: &DefinitionRegistry, id: InstanceId) -> Result<Attachment> {
        let instance = self.get_mut(id)?;
        let attachment = instance
            .attachment
            .take()
            .ok_or_else(|| Error::internal(format!("detach of unattached instance {id:?}")))?;

        let def = self.definition_of(registry, id)?;
        self.fire(&def, id, |fragment, ctx| {
            fragment.on_removed_from_slot(ctx, id, attachment.addr);
        })?;

        Ok(attachment)
    }

    /// Checks if an instance exists and is not stale.
    #[must_use]
    pub fn exists(&self, id: InstanceId) -> bool {
        let idx = id.index as usize;
        if idx >= self.generations.len() {
            return false;
        }
        self.generations[idx] == id.generation && id.generation % 2 == 1
    }

    /// Validates that an instance is live.
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound` for never-allocated or freed indices and
    /// `StaleInstance` for generation mismatches.
    pub fn validate(&self, id: InstanceId) -> Result<()> {
        let idx = id.index as usize;

        if idx >= self.generations.len() {
            return Err(Error::instance_not_found(id));
        }

        let current_gen = self.generations[idx];

        if current_gen != id.generation {
            // Generation mismatch - instance was destroyed and possibly reused
            return Err(Error::stale_instance(id));
        }

        if current_gen % 2 == 0 {
            // Even generation means the index is free
            return Err(Error::instance_not_found(id));
        }

        Ok(())
    }

    /// Gets an instance by id.
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound` or `StaleInstance` per [`validate`].
    ///
    /// [`validate`]: InstanceStore::validate
    pub fn get(&self, id: InstanceId) -> Result<&Instance> {
        self.validate(id)?;
        self.records[id.index as usize]
            .as_ref()
            .ok_or_else(|| Error::instance_not_found(id))
    }

    /// Gets an instance by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns `InstanceNotFound` or `StaleInstance` per [`validate`].
    ///
    /// [`validate`]: InstanceStore::validate
    pub fn get_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.validate(id)?;
        self.records[id.index as usize]
            .as_mut()
            .ok_or_else(|| Error::instance_not_found(id))
    }

    /// Returns the total number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live instances.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.records.iter().filter_map(Option::as_ref)
    }

    /// Returns the current generation for an index, if it exists.
    ///
    /// This is useful for debugging and testing.
    #[must_use]
    pub fn generation(&self, index: u64) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }

    // --- Private helpers ---

    /// Allocates an id, reusing freed indices when available.
    fn allocate(&mut self) -> InstanceId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            // Increment generation (was even/free, now odd/alive)
            self.generations[idx] += 1;
            InstanceId::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u64;
            // New instances start at generation 1 (odd = alive)
            self.generations.push(1);
            self.records.push(None);
            InstanceId::new(index, 1)
        }
    }

    /// Resolves the shared definition of a live instance.
    fn definition_of(
        &self,
        registry: &DefinitionRegistry,
        id: InstanceId,
    ) -> Result<Arc<Definition>> {
        let definition = self.get(id)?.definition;
        registry
            .get(definition)
            .cloned()
            .ok_or_else(|| Error::definition_not_found(definition))
    }

    /// Runs `hook` for every fragment of the instance's definition, in
    /// definition order, over a context borrowing the instance's locals.
    fn fire(
        &mut self,
        def: &Definition,
        id: InstanceId,
        hook: impl Fn(&dyn crate::fragment::Fragment, &mut HookContext<'_>),
    ) -> Result<()> {
        let instance = self.get_mut(id)?;
        let mut ctx = HookContext::new(&mut instance.locals);
        for fragment in def.fragments() {
            hook(fragment.as_ref(), &mut ctx);
        }
        Ok(())
    }
}
