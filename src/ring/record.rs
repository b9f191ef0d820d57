//! Record: the versioned unit stored per key

use crate::clock::VectorClock;
use crate::common::Digest;
use serde::{Deserialize, Serialize};

/// One version of a key.
///
/// Records are never edited in place. A write produces a new record whose
/// clock has been advanced at the writing node's slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    key: String,
    digest: Digest,
    value: String,
    clock: VectorClock,
}

impl Record {
    pub fn new(key: impl Into<String>, digest: Digest, value: impl Into<String>, clock: VectorClock) -> Self {
        Self {
            key: key.into(),
            digest,
            value: value.into(),
            clock,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Copy of this record with the clock advanced at `index`
    pub(crate) fn stamped(&self, index: usize) -> Record {
        let mut clock = self.clock.clone();
        clock.increment(index);
        Record {
            key: self.key.clone(),
            digest: self.digest,
            value: self.value.clone(),
            clock,
        }
    }
}
