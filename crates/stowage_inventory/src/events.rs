//! Change notifications for dependent observers.
//!
//! Every successful structural mutation raises a [`ChangeEvent`] into a
//! bounded ring buffer. Observers (UI, logging) resynchronize by asking for
//! everything past the last sequence number they saw.

use std::collections::VecDeque;

use stowage_foundation::{ContainerId, InstanceId, SlotAddr};

/// A structural change to some container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An instance landed in a slot.
    SlotFilled {
        /// The container mutated.
        container: ContainerId,
        /// The slot filled.
        addr: SlotAddr,
        /// The instance now in the slot.
        instance: InstanceId,
    },
    /// A slot was emptied.
    SlotCleared {
        /// The container mutated.
        container: ContainerId,
        /// The slot cleared.
        addr: SlotAddr,
        /// The instance that was in the slot.
        instance: InstanceId,
    },
    /// An instance moved between two slots in one logical step.
    Transferred {
        /// The instance moved.
        instance: InstanceId,
        /// Source container and slot.
        from: (ContainerId, SlotAddr),
        /// Destination container and slot.
        to: (ContainerId, SlotAddr),
    },
    /// Two occupied slots exchanged their instances.
    Swapped {
        /// First slot.
        a: (ContainerId, SlotAddr),
        /// Second slot.
        b: (ContainerId, SlotAddr),
    },
}

impl ChangeEvent {
    /// Returns a static string identifying the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SlotFilled { .. } => "slot-filled",
            Self::SlotCleared { .. } => "slot-cleared",
            Self::Transferred { .. } => "transferred",
            Self::Swapped { .. } => "swapped",
        }
    }
}

/// One buffered event with its sequence number.
#[derive(Clone, Debug)]
pub struct EventRecord {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The event.
    pub event: ChangeEvent,
}

/// A ring buffer of change events.
///
/// Maintains a fixed maximum size, discarding oldest records when full.
/// Sequence numbers keep increasing across eviction, so an observer that
/// fell behind can detect the gap.
#[derive(Clone, Debug)]
pub struct EventBuffer {
    /// The records, oldest first.
    records: VecDeque<EventRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next sequence number to assign.
    next_seq: u64,
}

impl EventBuffer {
    /// Creates a new event buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_seq: 0,
        }
    }

    /// Creates a buffer with default size (4096 records).
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(4096)
    }

    /// Pushes a new event. Returns the assigned sequence number.
    pub fn push(&mut self, event: ChangeEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.records.push_back(EventRecord { seq, event });

        // Evict oldest if over capacity
        while self.records.len() > self.max_size {
            self.records.pop_front();
        }

        seq
    }

    /// Returns the number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all buffered records.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Returns all records with sequence numbers past `seq`.
    ///
    /// An observer passes the last sequence number it processed; `u64::MAX`
    /// wraps are not a practical concern.
    #[must_use]
    pub fn events_since(&self, seq: u64) -> Vec<&EventRecord> {
        self.records.iter().filter(|r| r.seq > seq).collect()
    }

    /// Returns the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&EventRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns the oldest buffered sequence number.
    #[must_use]
    pub fn oldest_seq(&self) -> Option<u64> {
        self.records.front().map(|r| r.seq)
    }

    /// Returns the newest buffered sequence number.
    #[must_use]
    pub fn newest_seq(&self) -> Option<u64> {
        self.records.back().map(|r| r.seq)
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> EventBufferStats {
        let mut event_counts = std::collections::HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.event.event_type()).or_insert(0) += 1;
        }

        EventBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            oldest_seq: self.oldest_seq(),
            newest_seq: self.newest_seq(),
            event_counts,
        }
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::default_size()
    }
}

/// Statistics about an event buffer.
#[derive(Clone, Debug)]
pub struct EventBufferStats {
    /// Number of records currently buffered.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Oldest buffered sequence number.
    pub oldest_seq: Option<u64>,
    /// Newest buffered sequence number.
    pub newest_seq: Option<u64>,
    /// Count of each event type.
    pub event_counts: std::collections::HashMap<&'static str, usize>,
}
