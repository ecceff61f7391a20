//! Bounded, deduplicating message store.
//!
//! The store keeps the most recent [`DEFAULT_CAPACITY`] unique messages in insertion
//! order. Uniqueness is decided by [`Fingerprint`]; recording a message that is already
//! present changes nothing. Eviction is strict FIFO and ignores lookups.
//!
//! Alongside the messages the store maintains a field catalog: every attribute name
//! seen since the store was created, in first-seen order. Evicting a message does not
//! remove its fields from the catalog.

pub mod record;

pub use record::{display_value, normalize_whitespace, Fingerprint, MessageRecord};

use std::collections::{HashMap, HashSet, VecDeque};

/// Number of messages retained before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct MessageStore {
    capacity: usize,
    /// Fingerprints, oldest at the front
    ring: VecDeque<Fingerprint>,
    records: HashMap<Fingerprint, MessageRecord>,
    fields: Vec<String>,
    seen_fields: HashSet<String>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a store holding at most `capacity` messages (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ring: VecDeque::with_capacity(capacity),
            records: HashMap::with_capacity(capacity),
            fields: Vec::new(),
            seen_fields: HashSet::new(),
        }
    }

    /// Record a message. Returns `false` when an identical display line is already held.
    pub fn record(&mut self, candidate: MessageRecord) -> bool {
        let fingerprint = candidate.fingerprint().clone();
        if self.records.contains_key(&fingerprint) {
            return false;
        }

        for key in candidate.raw_fields().keys() {
            if self.seen_fields.insert(key.clone()) {
                self.fields.push(key.clone());
            }
        }

        self.ring.push_back(fingerprint.clone());
        self.records.insert(fingerprint, candidate);

        while self.ring.len() > self.capacity {
            if let Some(evicted) = self.ring.pop_front() {
                self.records.remove(&evicted);
            }
        }

        debug_assert_eq!(self.ring.len(), self.records.len());
        true
    }

    /// Record every message in order; returns how many were new.
    pub fn record_all<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = MessageRecord>,
    {
        let mut added = 0;
        for record in records {
            if self.record(record) {
                added += 1;
            }
        }
        added
    }

    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<&MessageRecord> {
        self.records.get(fingerprint)
    }

    /// Look a message up by the display line a renderer showed for it.
    pub fn lookup_line(&self, line: &str) -> Option<&MessageRecord> {
        self.lookup(&Fingerprint::of_line(line))
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records.contains_key(fingerprint)
    }

    /// Field catalog in first-seen order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Retained messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> + '_ {
        self.ring.iter().filter_map(|fp| self.records.get(fp))
    }

    /// Display lines of the retained messages, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|record| record.display().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all retained messages. The field catalog is kept.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.records.clear();
    }
}
