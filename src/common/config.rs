//! Configuration for ringkv
//!
//! Values come from (lowest to highest priority): built-in defaults, an
//! optional TOML file, then `RINGKV_*` environment variables.

use crate::common::{HashAlgorithm, Result};
use crate::store::WritePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum number of nodes on a ring; smaller requests are clamped up
pub const MIN_NODES: usize = 3;

/// Environment variable prefix (`RINGKV_NODE_COUNT`, `RINGKV_WRITE_POLICY`, ...)
pub const ENV_PREFIX: &str = "RINGKV";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of storage nodes (clamped to at least 3)
    #[serde(default = "default_node_count")]
    pub node_count: usize,

    /// Successors holding a copy in addition to the primary
    #[serde(default = "default_replica_count")]
    pub replica_count: usize,

    /// How many members of the replica set a `put` reaches
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Hash used for ring positions and record keys
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_node_count() -> usize {
    MIN_NODES
}
fn default_replica_count() -> usize {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            replica_count: default_replica_count(),
            write_policy: WritePolicy::default(),
            hash_algorithm: HashAlgorithm::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let config: Config = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Node count after the minimum clamp
    pub fn effective_node_count(&self) -> usize {
        self.node_count.max(MIN_NODES)
    }

    /// Reject settings that cannot yield distinct replicas
    pub fn validate(&self) -> Result<()> {
        let nodes = self.effective_node_count();
        if self.replica_count >= nodes {
            return Err(crate::Error::InvalidConfig(format!(
                "replica_count ({}) must be smaller than node_count ({})",
                self.replica_count, nodes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.node_count, 3);
        assert_eq!(config.replica_count, 2);
        assert_eq!(config.write_policy, WritePolicy::One);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Blake3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_node_count_clamped() {
        let config = Config {
            node_count: 1,
            ..Default::default()
        };
        assert_eq!(config.effective_node_count(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_replicas() {
        let config = Config {
            node_count: 4,
            replica_count: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "node_count = 7\nreplica_count = 3\nwrite_policy = \"quorum\"\nhash_algorithm = \"sha256\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.node_count, 7);
        assert_eq!(config.replica_count, 3);
        assert_eq!(config.write_policy, WritePolicy::Quorum);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "node_count = 3\nreplica_count = 5").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_serde_roundtrip_json() {
        let config = Config {
            write_policy: WritePolicy::All,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"write_policy\":\"all\""));
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
