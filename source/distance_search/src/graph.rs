//! Shared hyperedge model built from a flattened [`DetectorErrorModel`]:
//! nodes are detector ids plus a boundary super-node, and each error
//! mechanism with at most `D_max` symptoms becomes an undirected
//! hyperedge labeled by its observable mask. The boundary is
//! represented implicitly — an edge with one detector node is a
//! boundary edge, one with zero is a silent (or distance-1) edge.

use std::collections::HashMap;

use dem::{DemInstruction, DemTarget, DemTargetKind, DetectorErrorModel};

use crate::error::SearchError;

/// Sentinel standing in for the boundary super-node, mirroring
/// `min_distance.h`'s `NO_NODE_INDEX`.
pub const NO_DETECTOR: u64 = u64::MAX;

/// One error mechanism's symptom, reduced to the detector ids it flips
/// an odd number of times and the observable ids likewise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Sorted, deduplicated detector ids this edge touches.
    pub nodes: Vec<u64>,
    /// Bit `i` set means this edge flips observable `i`. Limited to 64
    /// observables, the same bound `DemAdjGraph::distance_1_error_mask`
    /// carries as a bare `uint64_t` in the original.
    pub obs_mask: u64,
}

impl Edge {
    #[must_use]
    pub fn crosses_observable(&self) -> bool {
        self.obs_mask != 0
    }
}

/// Per-detector adjacency lists over a DEM's error instructions, plus
/// any zero-symptom error that is itself a distance-1 logical fault.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub adjacency: Vec<Vec<Edge>>,
    pub distance_1_error_mask: Option<u64>,
}

impl Graph {
    /// Builds the adjacency model from `model`'s error instructions.
    ///
    /// `max_edge_degree` truncates: edges touching more than this many
    /// detectors are either dropped (`ignore_oversized`) or rejected
    /// with [`SearchError::UngraphlikeError`].
    pub fn from_dem(
        model: &DetectorErrorModel,
        max_edge_degree: usize,
        ignore_oversized: bool,
    ) -> Result<Self, SearchError> {
        let flat = model.flatten();
        let num_detectors = flat.num_detectors() as usize;
        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); num_detectors];
        let mut distance_1_error_mask = None;
        for instr in flat.instructions() {
            let DemInstruction::Error { probability, targets } = instr else { continue };
            if *probability <= 0.0 {
                continue;
            }
            for group in split_on_separator(targets) {
                let edge = edge_from_targets(&group);
                if edge.nodes.len() > max_edge_degree {
                    if ignore_oversized {
                        log::debug!(
                            "dropping error of weight {} above the degree-{max_edge_degree} search bound",
                            edge.nodes.len()
                        );
                        continue;
                    }
                    return Err(SearchError::UngraphlikeError { weight: edge.nodes.len() });
                }
                if edge.nodes.is_empty() {
                    if edge.crosses_observable() {
                        distance_1_error_mask.get_or_insert(edge.obs_mask);
                    }
                    continue;
                }
                for &n in &edge.nodes {
                    adjacency[n as usize].push(edge.clone());
                }
            }
        }
        Ok(Self { adjacency, distance_1_error_mask })
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }
}

fn split_on_separator(targets: &[DemTarget]) -> Vec<Vec<DemTarget>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for &t in targets {
        if t.is_separator() {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(t);
        }
    }
    groups.push(current);
    groups
}

fn edge_from_targets(group: &[DemTarget]) -> Edge {
    let mut detector_parity: HashMap<u64, bool> = HashMap::new();
    let mut obs_mask = 0u64;
    for &t in group {
        match t.kind() {
            DemTargetKind::Detector => {
                let seen = detector_parity.entry(t.id()).or_insert(false);
                *seen = !*seen;
            }
            DemTargetKind::Observable => {
                if let Some(bit) = 1u64.checked_shl(t.id() as u32) {
                    obs_mask ^= bit;
                }
            }
            DemTargetKind::Separator => {}
        }
    }
    let mut nodes: Vec<u64> =
        detector_parity.into_iter().filter(|&(_, present)| present).map(|(id, _)| id).collect();
    nodes.sort_unstable();
    Edge { nodes, obs_mask }
}

/// Renders a solution — a list of edges forming the undetectable
/// logical error — as a DEM of `p=1` error instructions.
pub fn dem_from_edges(edges: &[Edge]) -> DetectorErrorModel {
    let mut dem = DetectorErrorModel::new();
    for edge in edges {
        let mut targets: Vec<DemTarget> = edge.nodes.iter().map(|&id| DemTarget::detector(id)).collect();
        for bit in 0..64u32 {
            if edge.obs_mask & (1u64 << bit) != 0 {
                targets.push(DemTarget::observable(u64::from(bit)));
            }
        }
        dem.push(DemInstruction::Error { probability: 1.0, targets });
    }
    dem
}

/// Symmetric difference of two sorted, deduplicated detector-id lists.
#[must_use]
pub fn xor_node_sets(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut counts: HashMap<u64, u8> = HashMap::new();
    for &x in a {
        *counts.entry(x).or_insert(0) += 1;
    }
    for &x in b {
        *counts.entry(x).or_insert(0) += 1;
    }
    let mut result: Vec<u64> = counts.into_iter().filter(|&(_, c)| c % 2 == 1).map(|(k, _)| k).collect();
    result.sort_unstable();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dem::parse_dem_text;

    #[test]
    fn from_dem_builds_adjacency_and_distance_one_mask() {
        let model = parse_dem_text(
            "error(0.1) D0 D1\nerror(0.2) D1 L0\nerror(0.05) L0\nerror(0.0) D0 D2\n",
        )
        .unwrap();
        let graph = Graph::from_dem(&model, 2, false).unwrap();
        assert_eq!(graph.adjacency[0].len(), 1);
        assert_eq!(graph.adjacency[1].len(), 2);
        assert_eq!(graph.distance_1_error_mask, Some(1));
    }

    #[test]
    fn oversized_edge_is_rejected_unless_ignored() {
        let model = parse_dem_text("error(0.1) D0 D1 D2\n").unwrap();
        assert!(Graph::from_dem(&model, 2, false).is_err());
        assert!(Graph::from_dem(&model, 2, true).unwrap().adjacency.iter().all(Vec::is_empty));
    }

    #[test]
    fn xor_node_sets_cancels_shared_ids() {
        assert_eq!(xor_node_sets(&[1, 2], &[2, 3]), vec![1, 3]);
        assert_eq!(xor_node_sets(&[1, 2], &[1, 2]), Vec::<u64>::new());
    }
}
