//! String interning for tags.
//!
//! Tags key local-data entries and name slot kinds. They are interned so
//! equality is an integer compare and wire encodings stay compact.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned tag identifier.
///
/// Tags are short names like `durability`, `slot/main`, `warmth`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagId(pub(crate) u32);

impl TagId {
    /// Returns the raw index of this tag.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    // =========================================================================
    // Reserved Tags
    // =========================================================================
    // These are always interned at startup with fixed indices.

    /// Reserved tag for the general-purpose slot kind: `slot/main`
    pub const SLOT_MAIN: TagId = TagId(0);

    /// Reserved tag for the worn-equipment slot kind: `slot/clothes`
    pub const SLOT_CLOTHES: TagId = TagId(1);
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({})", self.0)
    }
}

/// Interner mapping tag strings to unique [`TagId`]s and back.
///
/// Not thread-safe; use external synchronization if needed.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagRegistry {
    /// Tag string storage, indexed by `TagId`.
    strings: Vec<Arc<str>>,
    /// Map from string to id.
    by_string: HashMap<Arc<str>, TagId>,
}

impl TagRegistry {
    /// Reserved tags that are pre-interned at startup.
    const RESERVED_TAGS: &'static [&'static str] = &[
        "slot/main",    // TagId(0) = SLOT_MAIN
        "slot/clothes", // TagId(1) = SLOT_CLOTHES
    ];

    /// Creates a new registry with reserved tags pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();

        for (i, &tag) in Self::RESERVED_TAGS.iter().enumerate() {
            let id = registry.intern(tag);
            debug_assert_eq!(
                id.0 as usize, i,
                "Reserved tag '{}' should have index {}, got {}",
                tag, i, id.0
            );
        }

        registry
    }

    /// Interns a tag, returning its [`TagId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned tags exceeds `u32::MAX`.
    pub fn intern(&mut self, s: &str) -> TagId {
        if let Some(&id) = self.by_string.get(s) {
            return id;
        }

        let idx = u32::try_from(self.strings.len()).expect("too many interned tags");
        let arc: Arc<str> = s.into();
        self.strings.push(arc.clone());
        let id = TagId(idx);
        self.by_string.insert(arc, id);
        id
    }

    /// Gets the string for a tag.
    #[must_use]
    pub fn resolve(&self, id: TagId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Looks up a tag by string without interning it.
    #[must_use]
    pub fn lookup(&self, s: &str) -> Option<TagId> {
        self.by_string.get(s).copied()
    }

    /// Returns the number of interned tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if no tags are interned (never the case after `new`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
