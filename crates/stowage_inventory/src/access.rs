//! Access control for containers.

use stowage_foundation::TagId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of an accessor (a player, an AI controller, an admin tool).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentId(pub u64);

/// An accessor plus the groups it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    /// The accessor's identity.
    pub id: AgentId,
    /// Group tags the accessor is a member of.
    pub groups: Vec<TagId>,
}

impl Agent {
    /// Creates an agent with no group memberships.
    #[must_use]
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            groups: Vec::new(),
        }
    }

    /// Adds a group membership.
    #[must_use]
    pub fn with_group(mut self, group: TagId) -> Self {
        self.groups.push(group);
        self
    }

    /// Returns true if the agent belongs to the group.
    #[must_use]
    pub fn is_member(&self, group: TagId) -> bool {
        self.groups.contains(&group)
    }
}

/// Who may move items in and out of a container.
///
/// The owner always has access regardless of policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessPolicy {
    /// Only the owner.
    Private,
    /// The owner and members of the named group.
    Group(TagId),
    /// Anyone.
    Public,
}

impl AccessPolicy {
    /// Checks whether the agent may access a container owned by `owner`.
    #[must_use]
    pub fn permits(&self, agent: &Agent, owner: AgentId) -> bool {
        if agent.id == owner {
            return true;
        }
        match self {
            Self::Private => false,
            Self::Group(group) => agent.is_member(*group),
            Self::Public => true,
        }
    }
}
