//! Conflict resolution across replica copies of one key

use crate::clock::Causality;
use crate::ring::Record;
use serde::Serialize;

/// Outcome of reconciling the versions read from a replica set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "records", rename_all = "lowercase")]
pub enum Resolution {
    /// One version causally dominates every other
    Resolved(Record),
    /// Concurrent versions; none dominates, the caller has to pick or merge
    Siblings(Vec<Record>),
}

impl Resolution {
    /// The winning record, if there is one
    pub fn winner(&self) -> Option<&Record> {
        match self {
            Resolution::Resolved(record) => Some(record),
            Resolution::Siblings(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Every version still standing (one for a resolved key)
    pub fn versions(&self) -> &[Record] {
        match self {
            Resolution::Resolved(record) => std::slice::from_ref(record),
            Resolution::Siblings(records) => records,
        }
    }
}

/// Pick the causally dominant record among `candidates`.
///
/// Returns `None` for an empty input. A single candidate comes back as is.
/// Exact copies of the same version are collapsed first, then every pair is
/// compared and the candidates no other candidate dominates are kept. One
/// survivor is the winner; several survivors are siblings. Ties are never
/// broken arbitrarily.
pub fn resolve(candidates: Vec<Record>) -> Option<Resolution> {
    let mut distinct: Vec<Record> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !distinct.contains(&candidate) {
            distinct.push(candidate);
        }
    }

    match distinct.len() {
        0 => return None,
        1 => return distinct.pop().map(Resolution::Resolved),
        _ => {}
    }

    let dominated: Vec<bool> = distinct
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            distinct
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.clock().compare(candidate.clock()) == Causality::After)
        })
        .collect();

    let mut survivors: Vec<Record> = distinct
        .into_iter()
        .zip(dominated)
        .filter_map(|(record, dominated)| (!dominated).then_some(record))
        .collect();

    if survivors.len() == 1 {
        survivors.pop().map(Resolution::Resolved)
    } else {
        Some(Resolution::Siblings(survivors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VectorClock;
    use crate::common::digest;

    fn record(value: &str, clock: Vec<u64>) -> Record {
        Record::new("key", digest(b"key"), value, VectorClock::from(clock))
    }

    #[test]
    fn test_empty() {
        assert!(resolve(vec![]).is_none());
    }

    #[test]
    fn test_single_candidate_unchanged() {
        let only = record("solo", vec![0, 0, 0]);
        assert_eq!(resolve(vec![only.clone()]), Some(Resolution::Resolved(only)));
    }

    #[test]
    fn test_dominant_version_wins() {
        let candidates = vec![
            record("0", vec![0, 0, 0, 0, 0]),
            record("1", vec![0, 0, 0, 0, 0]),
            record("2", vec![0, 1, 0, 0, 0]),
            record("3", vec![0, 0, 0, 0, 0]),
        ];
        let resolution = resolve(candidates).unwrap();
        assert_eq!(resolution.winner().unwrap().value(), "2");
    }

    #[test]
    fn test_chain_picks_latest() {
        let candidates = vec![
            record("old", vec![1, 0, 0]),
            record("newest", vec![2, 1, 1]),
            record("mid", vec![2, 1, 0]),
        ];
        let resolution = resolve(candidates).unwrap();
        assert_eq!(resolution.winner().unwrap().value(), "newest");
    }

    #[test]
    fn test_copies_of_one_version_resolve() {
        let v = record("v", vec![1, 0, 0]);
        let resolution = resolve(vec![v.clone(), v.clone(), v.clone()]).unwrap();
        assert_eq!(resolution, Resolution::Resolved(v));
    }

    #[test]
    fn test_concurrent_versions_are_siblings() {
        let a = record("a", vec![1, 0, 0]);
        let b = record("b", vec![0, 1, 0]);
        let resolution = resolve(vec![a.clone(), b.clone()]).unwrap();
        assert!(!resolution.is_resolved());
        assert_eq!(resolution.versions(), &[a, b]);
    }

    #[test]
    fn test_equal_clocks_different_values_are_siblings() {
        let resolution = resolve(vec![record("x", vec![0, 0]), record("y", vec![0, 0])]).unwrap();
        assert!(resolution.winner().is_none());
        assert_eq!(resolution.versions().len(), 2);
    }

    #[test]
    fn test_partial_dominance_is_not_a_winner() {
        // a beats c but not b; a pairwise scan that stops early would pick a
        let a = record("a", vec![1, 0]);
        let b = record("b", vec![0, 1]);
        let c = record("c", vec![0, 0]);
        let resolution = resolve(vec![a.clone(), b.clone(), c]).unwrap();
        assert_eq!(resolution, Resolution::Siblings(vec![a, b]));
    }
}
