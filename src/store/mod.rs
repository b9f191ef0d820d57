//! Store facade: `put` / `get` over the ring
//!
//! Write path: digest the key, find the primary and its replica set, build
//! the new version on top of the current one, then write to the nodes the
//! configured [`WritePolicy`] selects.
//!
//! Read path: query every member of the replica set, skip members without a
//! copy, and reconcile what was found with [`resolve`].

pub mod policy;

pub use policy::{WritePlan, WritePolicy};

use crate::clock::{resolve, Resolution, VectorClock};
use crate::common::{Config, Digest, Error, Result};
use crate::ring::{Node, Record, Ring};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError};

/// Replica count used by [`Store::new`]
pub const DEFAULT_REPLICAS: usize = 2;

pub struct Store {
    ring: Ring,
    policy: WritePolicy,
    rng: Mutex<StdRng>,
}

impl Store {
    /// Store of `max(node_count, 3)` nodes, two replicas, write-one policy
    pub fn new(node_count: usize) -> Result<Self> {
        let ring = Ring::build(node_count, DEFAULT_REPLICAS)?;
        Ok(Self::with_rng(ring, WritePolicy::One, StdRng::from_entropy()))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let ring = Ring::with_algorithm(config.node_count, config.replica_count, config.hash_algorithm)?;
        Ok(Self::with_rng(ring, config.write_policy, StdRng::from_entropy()))
    }

    /// Store with a caller-supplied RNG (seed it for reproducible placement)
    pub fn with_rng(ring: Ring, policy: WritePolicy, rng: StdRng) -> Self {
        Self {
            ring,
            policy,
            rng: Mutex::new(rng),
        }
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Primary node for `key`
    pub fn locate(&self, key: &str) -> Result<&Node> {
        self.ring.locate(&self.ring.digest(key.as_bytes()))
    }

    /// Store `value` under `key`; returns the version that was written
    pub fn put(&self, key: &str, value: &str) -> Result<Record> {
        let digest = self.ring.digest(key.as_bytes());
        let set = self.ring.preference_list(&digest)?;

        let context = self.context(key, &digest, &set);
        let record = Record::new(key, digest, value, context);

        let plan = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.policy.plan(&set, &mut *rng)
        }
        .ok_or(Error::RingLookup { digest })?;

        let stored = plan.coordinator.write(digest, record);
        let mut copies = 1;
        for follower in &plan.followers {
            if follower.replicate(digest, stored.clone()) {
                copies += 1;
            }
        }

        tracing::debug!(
            key,
            node = %plan.coordinator.name(),
            policy = %self.policy,
            copies,
            clock = %stored.clock(),
            "put"
        );
        Ok(stored)
    }

    /// Read `key`, failing if the replicas hold no single winning version
    pub fn get(&self, key: &str) -> Result<String> {
        match self.get_versions(key)? {
            Resolution::Resolved(record) => Ok(record.into_value()),
            Resolution::Siblings(records) => Err(Error::AmbiguousResolution {
                key: key.to_string(),
                siblings: records.into_iter().map(Record::into_value).collect(),
            }),
        }
    }

    /// Read `key` and return the reconciled versions, siblings included
    pub fn get_versions(&self, key: &str) -> Result<Resolution> {
        let digest = self.ring.digest(key.as_bytes());
        let set = self.ring.preference_list(&digest)?;
        let candidates = self.read_replicas(key, &digest, &set);
        resolve(candidates).ok_or_else(|| Error::NotFound {
            key: key.to_string(),
        })
    }

    fn read_replicas(&self, key: &str, digest: &Digest, set: &[&Node]) -> Vec<Record> {
        set.iter()
            .filter_map(|node| match node.read(digest) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(key, node = %node.name(), "replica miss: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Clock a new version of `key` starts from: the current winner's clock,
    /// the pointwise max over siblings (the write supersedes all of them), or
    /// zeros for a new key.
    fn context(&self, key: &str, digest: &Digest, set: &[&Node]) -> VectorClock {
        match resolve(self.read_replicas(key, digest, set)) {
            Some(Resolution::Resolved(current)) => current.clock().clone(),
            Some(Resolution::Siblings(siblings)) => {
                VectorClock::supremum(siblings.iter().map(|r| r.clock()))
            }
            None => VectorClock::zeroed(self.ring.node_count()),
        }
    }
}
