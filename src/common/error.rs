//! Error types for ringkv

use crate::common::Digest;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Placement Errors ===
    #[error("No node on the ring for digest {digest}")]
    RingLookup { digest: Digest },

    // === Storage Errors ===
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Record {digest} not found on {node}")]
    RecordNotFound { node: String, digest: Digest },

    // === Consistency Errors ===
    #[error("No authoritative value for {key}: {} concurrent versions", .siblings.len())]
    AmbiguousResolution { key: String, siblings: Vec<String> },

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    // === Generic ===
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Is this a routine miss (a replica or the whole replica set has no copy)?
    pub fn is_miss(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::RecordNotFound { .. })
    }

    /// Is this a conflict the caller has to settle?
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::AmbiguousResolution { .. })
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
