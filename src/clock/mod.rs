//! Vector clocks for causal ordering of record versions
//!
//! A clock holds one counter per ring node, indexed by the node's fixed
//! creation-order position. Two clocks compare as:
//! - `Before`: every slot ≤ the other's, at least one strictly less
//! - `After`: the mirror image
//! - `Concurrent`: neither of the above, which includes equal clocks

pub mod resolve;

pub use resolve::{resolve, Resolution};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Causal relation of one clock to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Causality {
    /// The first clock happened-before the second
    Before,
    /// The first clock happened-after (dominates) the second
    After,
    /// No event separates them, or they conflict
    Concurrent,
}

impl Causality {
    pub fn reverse(self) -> Self {
        match self {
            Causality::Before => Causality::After,
            Causality::After => Causality::Before,
            Causality::Concurrent => Causality::Concurrent,
        }
    }
}

/// Fixed-width vector clock
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock(Vec<u64>);

impl VectorClock {
    /// All-zero clock with one slot per node
    pub fn zeroed(slots: usize) -> Self {
        Self(vec![0; slots])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Counter at `index`, zero when out of range
    pub fn get(&self, index: usize) -> u64 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Bump the counter at `index`, growing the clock if needed
    pub fn increment(&mut self, index: usize) -> u64 {
        if index >= self.0.len() {
            self.0.resize(index + 1, 0);
        }
        self.0[index] += 1;
        self.0[index]
    }

    /// Take the element-wise maximum with `other` on every slot except `own`.
    ///
    /// A node uses this to copy what it learns from a record without ever
    /// advancing another node's slot past what that node wrote.
    pub fn absorb(&mut self, other: &VectorClock, own: usize) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (i, &theirs) in other.0.iter().enumerate() {
            if i != own && theirs > self.0[i] {
                self.0[i] = theirs;
            }
        }
    }

    /// Element-wise maximum of a set of clocks
    pub fn supremum<'a>(clocks: impl IntoIterator<Item = &'a VectorClock>) -> VectorClock {
        let mut out = VectorClock::default();
        for clock in clocks {
            if clock.0.len() > out.0.len() {
                out.0.resize(clock.0.len(), 0);
            }
            for (slot, &value) in out.0.iter_mut().zip(clock.0.iter()) {
                *slot = (*slot).max(value);
            }
        }
        out
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Causal relation of `self` to `other`
    pub fn compare(&self, other: &VectorClock) -> Causality {
        compare(&self.0, &other.0)
    }

    /// `self` strictly happened-after `other`
    pub fn dominates(&self, other: &VectorClock) -> bool {
        self.compare(other) == Causality::After
    }
}

impl From<Vec<u64>> for VectorClock {
    fn from(slots: Vec<u64>) -> Self {
        Self(slots)
    }
}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// Compare two clocks slot by slot.
///
/// Each slot contributes a sign (-1, 0, +1). The scan keeps a running
/// direction: zero signs fit any direction, the first non-zero sign sets it,
/// and a sign opposite to it ends the scan as `Concurrent`. An all-zero scan
/// is `Concurrent` too. Shorter clocks read as zero-padded.
pub fn compare(a: &[u64], b: &[u64]) -> Causality {
    let width = a.len().max(b.len());
    let mut direction = 0i8;

    for i in 0..width {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        let sign = match x.cmp(&y) {
            std::cmp::Ordering::Less => -1i8,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        };
        if sign == 0 || sign == direction {
            continue;
        }
        if sign == -direction {
            return Causality::Concurrent;
        }
        direction = sign;
    }

    match direction {
        -1 => Causality::Before,
        1 => Causality::After,
        _ => Causality::Concurrent,
    }
}
