//! Storage node: one shard of the ring
//!
//! Each node owns its record map and its slot of the vector-clock space behind
//! its own lock, so writers to different nodes never contend.

use crate::clock::{Causality, VectorClock};
use crate::common::{Digest, Error, Result};
use crate::ring::Record;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct NodeState {
    records: HashMap<Digest, Record>,
    clock: VectorClock,
}

/// A storage shard with a fixed ring position and clock index
#[derive(Debug)]
pub struct Node {
    name: String,
    digest: Digest,
    clock_index: usize,
    state: Mutex<NodeState>,
}

impl Node {
    pub fn new(name: impl Into<String>, digest: Digest, clock_index: usize, clock_width: usize) -> Self {
        Self {
            name: name.into(),
            digest,
            clock_index,
            state: Mutex::new(NodeState {
                records: HashMap::new(),
                clock: VectorClock::zeroed(clock_width),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ring position
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// This node's slot in every vector clock
    pub fn clock_index(&self) -> usize {
        self.clock_index
    }

    // The map is never left half-updated, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a local write.
    ///
    /// Advances this node's own clock slot and the record's slot for this
    /// node, then stores the stamped record under `digest`, replacing any
    /// earlier record. The whole sequence runs under the node lock.
    pub fn write(&self, digest: Digest, record: Record) -> Record {
        let stamped = record.stamped(self.clock_index);
        let mut state = self.lock();
        state.clock.increment(self.clock_index);
        state.clock.absorb(stamped.clock(), self.clock_index);
        state.records.insert(digest, stamped.clone());
        tracing::trace!(
            node = %self.name,
            digest = %digest.short(),
            clock = %stamped.clock(),
            "write applied"
        );
        stamped
    }

    /// Store a copy already stamped by another node.
    ///
    /// The node's own slot is left alone. A copy that does not causally
    /// follow the stored record is refused (returns `false`), so a stale or
    /// concurrent copy never overwrites a version this node holds.
    pub fn replicate(&self, digest: Digest, record: Record) -> bool {
        let mut state = self.lock();
        if let Some(existing) = state.records.get(&digest) {
            if existing == &record || record.clock().compare(existing.clock()) != Causality::After {
                return false;
            }
        }
        state.clock.absorb(record.clock(), self.clock_index);
        state.records.insert(digest, record);
        true
    }

    /// Read the record stored under `digest`; no clock is touched
    pub fn read(&self, digest: &Digest) -> Result<Record> {
        self.lock()
            .records
            .get(digest)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound {
                node: self.name.clone(),
                digest: *digest,
            })
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.lock().records.contains_key(digest)
    }

    /// Snapshot of this node's clock
    pub fn clock(&self) -> VectorClock {
        self.lock().clock.clone()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<Record> {
        self.lock().records.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::digest;

    fn node(index: usize) -> Node {
        let name = format!("Node{}", index);
        Node::new(name.clone(), digest(name.as_bytes()), index, 3)
    }

    fn record(key: &str, value: &str) -> Record {
        Record::new(key, digest(key.as_bytes()), value, VectorClock::zeroed(3))
    }

    #[test]
    fn test_write_stamps_own_slot() {
        let n = node(1);
        let r = record("key:0", "v0");
        let stored = n.write(r.digest(), r.clone());

        assert_eq!(stored.clock().as_slice(), &[0, 1, 0]);
        assert_eq!(n.clock().as_slice(), &[0, 1, 0]);
        assert_eq!(n.read(&r.digest()).unwrap(), stored);
    }

    #[test]
    fn test_write_replaces_prior() {
        let n = node(0);
        let first = n.write(digest(b"k"), record("k", "one"));
        let second = n.write(digest(b"k"), Record::new("k", digest(b"k"), "two", first.clock().clone()));

        assert_eq!(second.clock().as_slice(), &[2, 0, 0]);
        assert_eq!(n.read(&digest(b"k")).unwrap().value(), "two");
        assert_eq!(n.len(), 1);
        assert_eq!(n.clock().as_slice(), &[2, 0, 0]);
    }

    #[test]
    fn test_read_missing() {
        let n = node(2);
        let err = n.read(&digest(b"nope")).unwrap_err();
        assert!(err.is_miss());
        assert!(n.is_empty());
    }

    #[test]
    fn test_read_does_not_touch_clock() {
        let n = node(0);
        n.write(digest(b"k"), record("k", "v"));
        let before = n.clock();
        let _ = n.read(&digest(b"k")).unwrap();
        let _ = n.read(&digest(b"missing"));
        assert_eq!(n.clock(), before);
    }

    #[test]
    fn test_only_own_slot_is_incremented() {
        let n = node(2);
        let seen = Record::new("k", digest(b"k"), "v", VectorClock::from(vec![3, 4, 0]));
        n.write(digest(b"k"), seen);
        // Slots 0 and 1 copied from the record, slot 2 advanced locally
        assert_eq!(n.clock().as_slice(), &[3, 4, 1]);
    }

    #[test]
    fn test_replicate_keeps_own_slot() {
        let n = node(0);
        let copy = Record::new("k", digest(b"k"), "v", VectorClock::from(vec![0, 1, 0]));
        assert!(n.replicate(digest(b"k"), copy.clone()));
        assert_eq!(n.clock().as_slice(), &[0, 1, 0]);
        assert_eq!(n.read(&digest(b"k")).unwrap(), copy);
    }

    #[test]
    fn test_replicate_refuses_stale_or_concurrent() {
        let n = node(0);
        let newer = n.write(digest(b"k"), record("k", "new"));

        let stale = Record::new("k", digest(b"k"), "old", VectorClock::zeroed(3));
        assert!(!n.replicate(digest(b"k"), stale));

        let concurrent = Record::new("k", digest(b"k"), "other", VectorClock::from(vec![0, 1, 0]));
        assert!(!n.replicate(digest(b"k"), concurrent));

        assert!(!n.replicate(digest(b"k"), newer.clone()));
        assert_eq!(n.read(&digest(b"k")).unwrap(), newer);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_ticks() {
        let n = node(1);
        std::thread::scope(|s| {
            for t in 0..8 {
                let n = &n;
                s.spawn(move || {
                    for i in 0..50 {
                        let key = format!("t{}-k{}", t, i);
                        n.write(digest(key.as_bytes()), record(&key, "v"));
                    }
                });
            }
        });
        assert_eq!(n.clock().get(1), 400);
        assert_eq!(n.len(), 400);
    }
}
