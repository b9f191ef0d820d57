//! Verify replica health across the ring

use crate::clock::Resolution;
use crate::common::{Digest, Result};
use crate::store::Store;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub total_keys: usize,
    /// Every replica holds the winning version
    pub healthy: usize,
    /// A winner exists but some replicas are missing it or hold an older one
    pub under_replicated: usize,
    /// Replicas hold concurrent versions with no winner
    pub conflicted: usize,
    /// Records found on a node outside their key's replica set
    pub misplaced: usize,
}

/// Every key stored anywhere on the ring, by digest
pub(crate) fn all_keys(store: &Store) -> BTreeMap<Digest, String> {
    store
        .ring()
        .nodes()
        .flat_map(|node| node.records())
        .map(|record| (record.digest(), record.key().to_string()))
        .collect()
}

pub fn verify_ring(store: &Store) -> Result<VerifyReport> {
    tracing::info!("Starting ring verification");
    let ring = store.ring();
    let mut report = VerifyReport::default();

    for (digest, key) in all_keys(store) {
        report.total_keys += 1;
        let set = ring.preference_list(&digest)?;

        for node in ring.nodes() {
            if node.contains(&digest) && !set.iter().any(|m| m.digest() == node.digest()) {
                report.misplaced += 1;
            }
        }

        match store.get_versions(&key)? {
            Resolution::Resolved(winner) => {
                let current = set
                    .iter()
                    .filter(|node| node.read(&digest).map(|r| r == winner).unwrap_or(false))
                    .count();
                if current == set.len() {
                    report.healthy += 1;
                } else {
                    report.under_replicated += 1;
                }
            }
            Resolution::Siblings(siblings) => {
                tracing::debug!(key = %key, versions = siblings.len(), "conflicting replicas");
                report.conflicted += 1;
            }
        }
    }

    tracing::info!(
        total = report.total_keys,
        healthy = report.healthy,
        under_replicated = report.under_replicated,
        conflicted = report.conflicted,
        "Verification finished"
    );
    Ok(report)
}
