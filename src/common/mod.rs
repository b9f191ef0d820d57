//! Common utilities and types shared across ringkv

pub mod config;
pub mod error;
pub mod hash;

pub use config::{Config, MIN_NODES};
pub use error::{Error, Result};
pub use hash::{digest, Digest, HashAlgorithm, DIGEST_LEN};
