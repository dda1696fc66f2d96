//! Containers: typed slot arrays behind an access policy.

use std::collections::HashMap;

use stowage_foundation::{ContainerId, Error, Result, TagId};

use crate::access::{AccessPolicy, Agent, AgentId};
use crate::slots::SlotsArray;

/// The tag→count map fixing each slot array's size at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    arrays: Vec<(TagId, u32)>,
}

impl ContainerConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot array of the given kind and size.
    #[must_use]
    pub fn with_array(mut self, kind: TagId, count: u32) -> Self {
        self.arrays.push((kind, count));
        self
    }

    /// Returns the configured (kind, count) pairs in declaration order.
    #[must_use]
    pub fn arrays(&self) -> &[(TagId, u32)] {
        &self.arrays
    }
}

/// A set of fixed-size slot arrays keyed by kind, with an owner and an
/// access policy.
#[derive(Debug)]
pub struct Container {
    id: ContainerId,
    owner: AgentId,
    policy: AccessPolicy,
    arrays: Vec<SlotsArray>,
    by_kind: HashMap<TagId, usize>,
}

impl Container {
    /// Builds a container from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSlotKind` if the configuration names a kind twice.
    pub fn new(
        id: ContainerId,
        owner: AgentId,
        policy: AccessPolicy,
        config: &ContainerConfig,
    ) -> Result<Self> {
        let mut arrays = Vec::with_capacity(config.arrays().len());
        let mut by_kind = HashMap::with_capacity(config.arrays().len());
        for &(kind, count) in config.arrays() {
            if by_kind.insert(kind, arrays.len()).is_some() {
                return Err(Error::duplicate_slot_kind(kind));
            }
            arrays.push(SlotsArray::new(kind, count));
        }
        Ok(Self {
            id,
            owner,
            policy,
            arrays,
            by_kind,
        })
    }

    /// Returns this container's id.
    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns the owning agent.
    #[must_use]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    /// Returns the access policy.
    #[must_use]
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Replaces the access policy.
    pub fn set_policy(&mut self, policy: AccessPolicy) {
        self.policy = policy;
    }

    /// Checks whether the agent may move items in or out.
    #[must_use]
    pub fn permits(&self, agent: &Agent) -> bool {
        self.policy.permits(agent, self.owner)
    }

    /// Returns the slot array of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSlotKind` if the container has no such array.
    pub fn array(&self, kind: TagId) -> Result<&SlotsArray> {
        self.by_kind
            .get(&kind)
            .map(|&i| &self.arrays[i])
            .ok_or_else(|| Error::unknown_slot_kind(kind))
    }

    /// Returns the slot array of the given kind, mutably.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSlotKind` if the container has no such array.
    pub fn array_mut(&mut self, kind: TagId) -> Result<&mut SlotsArray> {
        self.by_kind
            .get(&kind)
            .map(|&i| &mut self.arrays[i])
            .ok_or_else(|| Error::unknown_slot_kind(kind))
    }

    /// Iterates over the slot arrays in declaration order.
    pub fn arrays(&self) -> impl Iterator<Item = &SlotsArray> {
        self.arrays.iter()
    }

    /// Iterates over the slot kinds in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = TagId> + '_ {
        self.arrays.iter().map(SlotsArray::kind)
    }
}
