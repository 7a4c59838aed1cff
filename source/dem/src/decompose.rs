//! Graphlike decomposition: splitting a high-weight error's detector
//! symptom into pieces that touch at most two detectors each, the
//! shape `distance_search`'s matching-graph search requires.
//!
//! Mirrors a pool-based search: whenever a weight-&le;2 piece is seen
//! (directly, or as the byproduct of a successful split), it is kept
//! around so a later, unrelated high-weight error can reuse it as one
//! half of its own split.

use crate::target::DemTargetKind;
use crate::target_set::DemTargetSet;

/// Number of detector-kind targets in `targets`; observable references
/// and `^` separators don't count against the graphlike weight bound.
fn detector_weight(targets: &DemTargetSet) -> usize {
    targets.iter().filter(|t| t.kind() == DemTargetKind::Detector).count()
}

/// A pool of previously discovered graphlike (weight &le; 2) symptoms,
/// searched to decompose higher-weight ones.
#[derive(Default)]
pub struct GraphlikePool {
    seen: Vec<DemTargetSet>,
}

impl GraphlikePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&mut self, piece: DemTargetSet) {
        if !self.seen.contains(&piece) {
            self.seen.push(piece);
        }
    }

    /// Attempts to split `target` into graphlike pieces. Returns `None`
    /// if no split using the current pool succeeds; the caller decides
    /// whether that is a hard failure or an acceptable unsplit error.
    pub fn decompose(&mut self, target: &DemTargetSet) -> Option<Vec<DemTargetSet>> {
        if detector_weight(target) <= 2 {
            self.remember(target.clone());
            return Some(vec![target.clone()]);
        }
        for candidate in self.seen.clone() {
            let mut remainder = target.clone();
            remainder.xor_assign(&candidate);
            if detector_weight(&remainder) <= 2 && !remainder.is_empty() {
                self.remember(remainder.clone());
                return Some(vec![candidate, remainder]);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DemTarget;

    fn set(ids: &[u64]) -> DemTargetSet {
        ids.iter().map(|&id| DemTarget::detector(id)).collect()
    }

    #[test]
    fn weight_two_or_less_is_already_graphlike() {
        let mut pool = GraphlikePool::new();
        let pieces = pool.decompose(&set(&[0, 1])).unwrap();
        assert_eq!(pieces, vec![set(&[0, 1])]);
    }

    #[test]
    fn weight_four_splits_using_a_previously_seen_weight_two_piece() {
        let mut pool = GraphlikePool::new();
        pool.decompose(&set(&[0, 1])).unwrap();
        let pieces = pool.decompose(&set(&[0, 1, 2, 3])).unwrap();
        assert_eq!(pieces.len(), 2);
        let mut rebuilt = DemTargetSet::new();
        for piece in &pieces {
            rebuilt.xor_assign(piece);
        }
        assert_eq!(rebuilt, set(&[0, 1, 2, 3]));
    }

    #[test]
    fn unsplittable_weight_returns_none() {
        let mut pool = GraphlikePool::new();
        assert!(pool.decompose(&set(&[0, 1, 2])).is_none());
    }
}
