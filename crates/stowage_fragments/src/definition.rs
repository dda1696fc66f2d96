//! Definitions: immutable, shared archetypes composed of fragments.

use std::collections::HashMap;
use std::sync::Arc;

use stowage_foundation::{DefinitionId, Error, Result, TagId};

use crate::fragment::Fragment;

/// An immutable archetype: a name tag plus an ordered fragment list.
///
/// Definitions are built through [`DefinitionBuilder`], sealed at
/// registration, and shared by every instance that references them. There is
/// no mutation surface after registration.
#[derive(Debug)]
pub struct Definition {
    id: DefinitionId,
    name: TagId,
    fragments: Vec<Arc<dyn Fragment>>,
}

impl Definition {
    /// Returns this definition's registry id.
    #[must_use]
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    /// Returns this definition's name tag.
    #[must_use]
    pub fn name(&self) -> TagId {
        self.name
    }

    /// Returns the fragments in definition order.
    #[must_use]
    pub fn fragments(&self) -> &[Arc<dyn Fragment>] {
        &self.fragments
    }

    /// Returns the first fragment of concrete type `T`.
    ///
    /// Linear scan; fragment lists are short by construction.
    #[must_use]
    pub fn fragment<T: Fragment>(&self) -> Option<&T> {
        self.fragments
            .iter()
            .find_map(|f| f.as_any().downcast_ref::<T>())
    }

    /// Returns the first fragment of concrete type `T`, or an error naming
    /// the missing type.
    ///
    /// # Errors
    ///
    /// Returns `FragmentNotFound` if no fragment of type `T` is attached.
    pub fn fragment_ok<T: Fragment>(&self) -> Result<&T> {
        self.fragment::<T>()
            .ok_or_else(|| Error::fragment_not_found(self.id, std::any::type_name::<T>()))
    }
}

/// Builder for a [`Definition`].
pub struct DefinitionBuilder {
    name: TagId,
    fragments: Vec<Arc<dyn Fragment>>,
}

impl DefinitionBuilder {
    /// Starts a definition with the given name tag.
    #[must_use]
    pub fn new(name: TagId) -> Self {
        Self {
            name,
            fragments: Vec::new(),
        }
    }

    /// Appends a fragment. Order is preserved: hooks fire in append order.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Fragment) -> Self {
        self.fragments.push(Arc::new(fragment));
        self
    }

    /// Appends an already-shared fragment.
    #[must_use]
    pub fn with_shared_fragment(mut self, fragment: Arc<dyn Fragment>) -> Self {
        self.fragments.push(fragment);
        self
    }
}

/// Registry of all definitions, loaded once and read-only afterwards.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<Arc<Definition>>,
    by_name: HashMap<TagId, DefinitionId>,
}

impl DefinitionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seals a builder into the registry, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDefinition` if a definition with the same name tag
    /// is already registered.
    ///
    /// # Panics
    ///
    /// Panics if the number of definitions exceeds `u32::MAX`.
    pub fn register(&mut self, builder: DefinitionBuilder) -> Result<DefinitionId> {
        if self.by_name.contains_key(&builder.name) {
            return Err(Error::duplicate_definition(builder.name));
        }

        let id = DefinitionId(
            u32::try_from(self.definitions.len()).expect("too many definitions"),
        );
        self.definitions.push(Arc::new(Definition {
            id,
            name: builder.name,
            fragments: builder.fragments,
        }));
        self.by_name.insert(builder.name, id);
        Ok(id)
    }

    /// Gets a definition by id.
    #[must_use]
    pub fn get(&self, id: DefinitionId) -> Option<&Arc<Definition>> {
        self.definitions.get(id.index() as usize)
    }

    /// Looks up a definition id by name tag.
    #[must_use]
    pub fn lookup(&self, name: TagId) -> Option<DefinitionId> {
        self.by_name.get(&name).copied()
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Definition>> {
        self.definitions.iter()
    }
}
