//! Per-instance tag-keyed scalar data.

use stowage_foundation::{Error, Result, TagId, Value, ValueKind};
use stowage_replication::{CompactionPolicy, Cursor, DeltaMap, MapDelta};

/// Tag-keyed scalar dictionary attached to an instance.
///
/// Keys are unique per instance. Each entry replicates independently: a `set`
/// dirties only the touched entry, and removal is a tombstone (see the
/// replication layer). Fragments seed and mutate local data through their
/// lifecycle hooks; everything per-instance lives here.
#[derive(Clone, Debug, Default)]
pub struct LocalData {
    entries: DeltaMap<TagId, Value>,
}

impl LocalData {
    /// Creates empty local data with the default compaction policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DeltaMap::new(),
        }
    }

    /// Creates empty local data with the given compaction policy.
    #[must_use]
    pub fn with_policy(policy: CompactionPolicy) -> Self {
        Self {
            entries: DeltaMap::with_policy(policy),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the tag has a value.
    #[must_use]
    pub fn contains(&self, tag: TagId) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Gets the raw value for a tag.
    #[must_use]
    pub fn get(&self, tag: TagId) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Sets the value for a tag, inserting or replacing. Returns the
    /// previous value, if any.
    pub fn set(&mut self, tag: TagId, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(tag, value.into())
    }

    /// Removes the value for a tag. Returns the removed value.
    ///
    /// Cheap on the wire: the removal is a tombstone delta, paid for later by
    /// amortized compaction.
    pub fn remove(&mut self, tag: TagId) -> Option<Value> {
        self.entries.remove(&tag)
    }

    /// Gets a boolean, or `None` if the tag is absent.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the tag holds a non-boolean value.
    pub fn get_bool(&self, tag: TagId) -> Result<Option<bool>> {
        self.typed(tag, ValueKind::Bool, Value::as_bool)
    }

    /// Gets an integer, or `None` if the tag is absent.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the tag holds a non-integer value.
    pub fn get_int(&self, tag: TagId) -> Result<Option<i64>> {
        self.typed(tag, ValueKind::Int, Value::as_int)
    }

    /// Gets a float, or `None` if the tag is absent.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the tag holds a non-float value.
    pub fn get_float(&self, tag: TagId) -> Result<Option<f64>> {
        self.typed(tag, ValueKind::Float, Value::as_float)
    }

    /// Gets a string, or `None` if the tag is absent.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the tag holds a non-string value.
    pub fn get_str(&self, tag: TagId) -> Result<Option<&str>> {
        self.typed(tag, ValueKind::String, Value::as_str)
    }

    fn typed<'a, T>(
        &'a self,
        tag: TagId,
        expected: ValueKind,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(tag) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| Error::type_mismatch(expected, value.kind())),
        }
    }

    /// Iterates over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&TagId, &Value)> {
        self.entries.iter()
    }

    /// Collects the delta a receiver at `cursor` needs to converge.
    #[must_use]
    pub fn collect_since(&self, cursor: Cursor) -> MapDelta<TagId, Value> {
        self.entries.collect_since(cursor)
    }

    /// Drops tombstones, forcing receivers through one full resync.
    pub fn compact(&mut self) {
        self.entries.compact();
    }

    /// Returns a copy holding the same values under fresh replication
    /// bookkeeping.
    ///
    /// Used by instance duplication: a replica of the copy must receive the
    /// full picture, not the source's delta history.
    #[must_use]
    pub fn value_copy(&self) -> Self {
        let mut copy = Self::new();
        for (tag, value) in self.iter() {
            copy.set(*tag, value.clone());
        }
        copy
    }
}
