//! Hashing utilities for ringkv
//!
//! - BLAKE3 (default) or SHA-256 digests for ring positions and record keys
//! - `Digest` is a fixed 32-byte value ordered byte-wise, so sorting digests
//!   yields the ring order

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Length of every digest in bytes
pub const DIGEST_LEN: usize = 32;

/// Fixed-length hash of a node name or a record key
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Smallest possible digest (all zero bytes)
    pub const MIN: Digest = Digest([0u8; DIGEST_LEN]);

    /// Largest possible digest (all 0xff bytes)
    pub const MAX: Digest = Digest([0xffu8; DIGEST_LEN]);

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Parse a 64-character hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| crate::Error::Other(format!("invalid digest {:?}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    /// Short prefix used in log lines
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

/// Hash function used to place nodes and keys on the ring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    /// Hash `data` with a fresh hasher. Nothing is carried over between calls.
    pub fn digest(&self, data: &[u8]) -> Digest {
        match self {
            HashAlgorithm::Blake3 => Digest(*blake3::hash(data).as_bytes()),
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                Digest(hasher.finalize().into())
            }
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Blake3 => write!(f, "blake3"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Compute the default (BLAKE3) digest of `data`
pub fn digest(data: &[u8]) -> Digest {
    HashAlgorithm::Blake3.digest(data)
}
