//! Consistent-hash ring
//!
//! Nodes are placed at the digest of their name and sorted ascending. A
//! digest belongs to the first node at or after it, wrapping to the lowest
//! node past the top of the ring. Each node's replica set is its next
//! `replica_count` successors in ring order. The layout is computed once and
//! never changes, so lookups need no synchronisation.

use crate::common::{Digest, Error, HashAlgorithm, Result, MIN_NODES};
use crate::ring::Node;
use std::collections::HashMap;

/// Name of the node created at `index`
pub fn node_name(index: usize) -> String {
    format!("Node{}", index)
}

/// Static ring of storage nodes
#[derive(Debug)]
pub struct Ring {
    /// Node digests, ascending
    sorted: Vec<Digest>,
    nodes: HashMap<Digest, Node>,
    /// Primary digest → successor digests, in ring order
    replicas: HashMap<Digest, Vec<Digest>>,
    replica_count: usize,
    node_count: usize,
    algorithm: HashAlgorithm,
}

impl Ring {
    /// Build a ring of `max(node_count, 3)` nodes hashed with BLAKE3
    pub fn build(node_count: usize, replica_count: usize) -> Result<Self> {
        Self::with_algorithm(node_count, replica_count, HashAlgorithm::default())
    }

    pub fn with_algorithm(node_count: usize, replica_count: usize, algorithm: HashAlgorithm) -> Result<Self> {
        let node_count = node_count.max(MIN_NODES);
        if replica_count >= node_count {
            return Err(Error::InvalidConfig(format!(
                "replica_count ({}) must be smaller than node_count ({})",
                replica_count, node_count
            )));
        }

        // Clock index is the creation index, independent of ring order
        let mut created: Vec<Node> = (0..node_count)
            .map(|i| {
                let name = node_name(i);
                let digest = algorithm.digest(name.as_bytes());
                Node::new(name, digest, i, node_count)
            })
            .collect();
        created.sort_by_key(|node| node.digest());

        let sorted: Vec<Digest> = created.iter().map(|node| node.digest()).collect();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidConfig("two nodes hash to the same ring position".into()));
        }

        let replicas: HashMap<Digest, Vec<Digest>> = sorted
            .iter()
            .enumerate()
            .map(|(i, &digest)| {
                let successors = (1..=replica_count)
                    .map(|step| sorted[(i + step) % node_count])
                    .collect();
                (digest, successors)
            })
            .collect();

        let nodes: HashMap<Digest, Node> = created.into_iter().map(|node| (node.digest(), node)).collect();

        tracing::info!(
            nodes = node_count,
            replicas = replica_count,
            algorithm = %algorithm,
            "Built hash ring"
        );

        Ok(Self {
            sorted,
            nodes,
            replicas,
            replica_count,
            node_count,
            algorithm,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn replica_count(&self) -> usize {
        self.replica_count
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest of `key` under this ring's hash
    pub fn digest(&self, key: &[u8]) -> Digest {
        self.algorithm.digest(key)
    }

    /// Node at a ring position, if one sits exactly there
    pub fn node(&self, digest: &Digest) -> Option<&Node> {
        self.nodes.get(digest)
    }

    /// Nodes in ring order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.sorted.iter().filter_map(move |d| self.nodes.get(d))
    }

    /// Primary node for `digest`: the first node at or after it, wrapping
    /// around to the lowest node.
    pub fn locate(&self, digest: &Digest) -> Result<&Node> {
        let first = self.sorted.first().ok_or(Error::RingLookup { digest: *digest })?;
        let idx = self.sorted.partition_point(|d| d < digest);
        let owner = self.sorted.get(idx).unwrap_or(first);
        self.nodes.get(owner).ok_or(Error::RingLookup { digest: *digest })
    }

    /// `[primary] + replicas(primary)`, in the order fixed at build time
    pub fn replica_set<'a>(&'a self, primary: &'a Node) -> Result<Vec<&'a Node>> {
        let lookup_err = || Error::RingLookup {
            digest: primary.digest(),
        };
        let successors = self.replicas.get(&primary.digest()).ok_or_else(lookup_err)?;

        let mut set = Vec::with_capacity(successors.len() + 1);
        set.push(primary);
        for digest in successors {
            set.push(self.nodes.get(digest).ok_or_else(lookup_err)?);
        }
        Ok(set)
    }

    /// Replica set responsible for a key digest
    pub fn preference_list(&self, digest: &Digest) -> Result<Vec<&Node>> {
        let primary = self.locate(digest)?;
        self.replica_set(primary)
    }

    /// Cyclic ownership arc `(predecessor, node]` of a ring member
    pub fn owned_range(&self, node: &Node) -> Option<(Digest, Digest)> {
        let idx = self.sorted.binary_search(&node.digest()).ok()?;
        let pred = if idx == 0 {
            self.sorted[self.node_count - 1]
        } else {
            self.sorted[idx - 1]
        };
        Some((pred, node.digest()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{digest, DIGEST_LEN};
    use std::collections::HashSet;

    #[test]
    fn test_three_node_ring() {
        let ring = Ring::build(3, 2).unwrap();
        assert_eq!(ring.node_count(), 3);
        assert_eq!(ring.nodes().count(), 3);

        for node in ring.nodes() {
            let set = ring.replica_set(node).unwrap();
            assert_eq!(set.len(), 3);
            assert_eq!(set[0].digest(), node.digest());
            let others: HashSet<_> = set[1..].iter().map(|n| n.digest()).collect();
            let expected: HashSet<_> = ring
                .nodes()
                .filter(|n| n.digest() != node.digest())
                .map(|n| n.digest())
                .collect();
            assert_eq!(others, expected);
        }
    }

    #[test]
    fn test_node_count_clamped() {
        let ring = Ring::build(0, 2).unwrap();
        assert_eq!(ring.node_count(), 3);
        let ring = Ring::build(1, 1).unwrap();
        assert_eq!(ring.node_count(), 3);
    }

    #[test]
    fn test_replica_count_must_be_smaller() {
        assert!(Ring::build(3, 3).is_err());
        assert!(Ring::build(5, 7).is_err());
        assert!(Ring::build(5, 4).is_ok());
    }

    #[test]
    fn test_sorted_and_indexed_by_creation() {
        let ring = Ring::build(6, 2).unwrap();
        let digests: Vec<Digest> = ring.nodes().map(|n| n.digest()).collect();
        assert!(digests.windows(2).all(|w| w[0] < w[1]));

        for node in ring.nodes() {
            assert_eq!(node.name(), node_name(node.clock_index()));
            assert_eq!(node.digest(), digest(node.name().as_bytes()));
        }
        let indices: HashSet<usize> = ring.nodes().map(|n| n.clock_index()).collect();
        assert_eq!(indices, (0..6).collect());
    }

    #[test]
    fn test_replicas_are_successors() {
        let ring = Ring::build(8, 3).unwrap();
        let order: Vec<Digest> = ring.nodes().map(|n| n.digest()).collect();
        for (i, node) in ring.nodes().enumerate() {
            let set = ring.replica_set(node).unwrap();
            let expected: Vec<Digest> = (0..=3).map(|s| order[(i + s) % 8]).collect();
            let got: Vec<Digest> = set.iter().map(|n| n.digest()).collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_locate_exact_and_wraparound() {
        let ring = Ring::build(5, 2).unwrap();
        let order: Vec<Digest> = ring.nodes().map(|n| n.digest()).collect();

        // A node's own digest belongs to that node
        for d in &order {
            assert_eq!(ring.locate(d).unwrap().digest(), *d);
        }
        // Below the first node and above the last node both go to position 0
        assert_eq!(ring.locate(&Digest::MIN).unwrap().digest(), order[0]);
        assert_eq!(ring.locate(&Digest::MAX).unwrap().digest(), order[0]);
    }

    #[test]
    fn test_locate_just_past_a_node() {
        let ring = Ring::build(4, 1).unwrap();
        let order: Vec<Digest> = ring.nodes().map(|n| n.digest()).collect();
        let mut bytes = *order[1].as_bytes();
        // Increment as a big-endian number
        for b in bytes.iter_mut().rev() {
            let (next, overflow) = b.overflowing_add(1);
            *b = next;
            if !overflow {
                break;
            }
        }
        let past = Digest::from_bytes(bytes);
        assert_eq!(ring.locate(&past).unwrap().digest(), order[2]);
    }

    #[test]
    fn test_owned_ranges_cover_ring() {
        let ring = Ring::build(7, 2).unwrap();
        let order: Vec<Digest> = ring.nodes().map(|n| n.digest()).collect();
        for (i, node) in ring.nodes().enumerate() {
            let (pred, end) = ring.owned_range(node).unwrap();
            assert_eq!(end, node.digest());
            assert_eq!(pred, order[(i + 7 - 1) % 7]);
        }
        // Exactly one arc wraps around the top of the digest space
        let wrapping = ring
            .nodes()
            .filter_map(|n| ring.owned_range(n))
            .filter(|(pred, end)| pred > end)
            .count();
        assert_eq!(wrapping, 1);
        assert_eq!(DIGEST_LEN, order[0].as_bytes().len());
    }

    #[test]
    fn test_foreign_node_has_no_replica_set() {
        let ring = Ring::build(3, 2).unwrap();
        let stranger = Node::new("Stranger", digest(b"Stranger"), 0, 3);
        assert!(ring.replica_set(&stranger).is_err());
        assert!(ring.owned_range(&stranger).is_none());
    }

    #[test]
    fn test_sha256_ring() {
        let ring = Ring::with_algorithm(4, 2, HashAlgorithm::Sha256).unwrap();
        assert_eq!(ring.algorithm(), HashAlgorithm::Sha256);
        for node in ring.nodes() {
            assert_eq!(node.digest(), HashAlgorithm::Sha256.digest(node.name().as_bytes()));
        }
    }
}
