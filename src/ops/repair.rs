//! Repair under-replicated keys
//!
//! For every key with a winning version, copy that version to each replica
//! that lacks it or holds an older one. Keys with concurrent versions are
//! left alone: choosing between siblings belongs to the writer.

use crate::clock::Resolution;
use crate::common::Result;
use crate::ops::verify::all_keys;
use crate::store::Store;
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub keys_checked: usize,
    pub keys_repaired: usize,
    pub copies_written: usize,
    pub conflicts_skipped: usize,
}

pub fn repair_ring(store: &Store, dry_run: bool) -> Result<RepairReport> {
    tracing::info!(dry_run, "Starting ring repair");
    let ring = store.ring();
    let mut report = RepairReport::default();

    for (digest, key) in all_keys(store) {
        report.keys_checked += 1;

        let winner = match store.get_versions(&key)? {
            Resolution::Resolved(winner) => winner,
            Resolution::Siblings(siblings) => {
                tracing::warn!(key = %key, versions = siblings.len(), "skipping conflicted key");
                report.conflicts_skipped += 1;
                continue;
            }
        };

        let mut written = 0;
        for node in ring.preference_list(&digest)? {
            let current = node.read(&digest).map(|r| r == winner).unwrap_or(false);
            if current {
                continue;
            }
            if dry_run || node.replicate(digest, winner.clone()) {
                written += 1;
            }
        }

        if written > 0 {
            tracing::debug!(key = %key, copies = written, "repaired");
            report.keys_repaired += 1;
            report.copies_written += written;
        }
    }

    tracing::info!(
        checked = report.keys_checked,
        repaired = report.keys_repaired,
        copies = report.copies_written,
        "Repair finished"
    );
    Ok(report)
}
