//! Write policies: how far a `put` fans out across a replica set
//!
//! | policy   | nodes written                      | copies after one put |
//! |----------|------------------------------------|----------------------|
//! | `one`    | one member, chosen at random       | 1                    |
//! | `quorum` | primary + successors to a majority | len / 2 + 1          |
//! | `all`    | every member                       | len                  |
//!
//! Under `one` a later read may find the key on a single replica only, and a
//! lost node loses every key it alone held. `all` keeps every replica current.

use crate::ring::Node;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Write to a single random member of the replica set
    #[default]
    One,
    /// Write to a majority, primary first
    Quorum,
    /// Write to every member
    All,
}

/// Nodes chosen for one write
#[derive(Debug)]
pub struct WritePlan<'a> {
    /// Stamps the record with its clock slot
    pub coordinator: &'a Node,
    /// Receive the stamped copy unchanged
    pub followers: Vec<&'a Node>,
}

impl WritePolicy {
    /// Number of copies a single put leaves in a set of `set_len` nodes
    pub fn copies(&self, set_len: usize) -> usize {
        match self {
            WritePolicy::One => set_len.min(1),
            WritePolicy::Quorum => set_len / 2 + 1,
            WritePolicy::All => set_len,
        }
    }

    /// Choose the nodes to write. `set` is primary first, as the ring
    /// returns it. Returns `None` for an empty set.
    pub fn plan<'a, R: Rng + ?Sized>(&self, set: &[&'a Node], rng: &mut R) -> Option<WritePlan<'a>> {
        match self {
            WritePolicy::One => set.choose(rng).map(|&coordinator| WritePlan {
                coordinator,
                followers: Vec::new(),
            }),
            WritePolicy::Quorum | WritePolicy::All => {
                let (&coordinator, rest) = set.split_first()?;
                let followers = rest.iter().take(self.copies(set.len()) - 1).copied().collect();
                Some(WritePlan {
                    coordinator,
                    followers,
                })
            }
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::One => write!(f, "one"),
            WritePolicy::Quorum => write!(f, "quorum"),
            WritePolicy::All => write!(f, "all"),
        }
    }
}

impl FromStr for WritePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(WritePolicy::One),
            "quorum" => Ok(WritePolicy::Quorum),
            "all" => Ok(WritePolicy::All),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown write policy: {}",
                other
            ))),
        }
    }
}
