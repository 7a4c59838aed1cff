//! Hyper search (`D_max >= 3`), grounded on
//! `original_source/src/stim/search/hyper/{algo.h,graph.cc}`. States
//! are arbitrary detector sets (not just pairs); a transition XORs in
//! one admissible edge's node set. Three knobs keep the otherwise
//! exponential search tractable.

use std::collections::VecDeque;

use dem::DetectorErrorModel;
use rustc_hash::FxHashMap;

use crate::error::SearchError;
use crate::graph::{dem_from_edges, xor_node_sets, Edge, Graph};

/// The three truncation knobs `hyper/algo.h`'s
/// `find_undetectable_logical_error` takes by position, named here
/// for what each one bounds.
#[derive(Clone, Copy, Debug)]
pub struct HyperSearchOptions {
    /// Refuse transitions producing a state with more than this many
    /// detectors (`dont_explore_detection_event_sets_with_size_above`).
    pub max_state_size: usize,
    /// Never consider edges touching more than this many detectors
    /// (`dont_explore_edges_with_degree_above`).
    pub max_edge_degree: usize,
    /// Never cross an edge that would strictly increase the detector
    /// count of the current state
    /// (`dont_explore_edges_increasing_symptom_degree`). Turns the
    /// search into a parallel cancellation instead of an exponential
    /// blow-up; setting `max_state_size = max_edge_degree = 2` with
    /// this `false` recovers the graphlike search.
    pub monotonic_degree: bool,
}

impl Default for HyperSearchOptions {
    fn default() -> Self {
        Self { max_state_size: 4, max_edge_degree: 4, monotonic_degree: true }
    }
}

type StateKey = (Vec<u64>, u64);

enum Origin {
    Seed(Edge),
    Step { from: StateKey, edge: Edge },
}

/// Finds a minimum-size list of errors from `model` that form an
/// undetectable logical error, searching hyperedges up to
/// `options.max_edge_degree` rather than only graphlike (degree &le; 2)
/// ones. Exponential without aggressive truncation; see
/// [`HyperSearchOptions`].
pub fn find_undetectable_logical_error(
    model: &DetectorErrorModel,
    options: &HyperSearchOptions,
) -> Result<DetectorErrorModel, SearchError> {
    let graph = Graph::from_dem(model, options.max_edge_degree, true)?;
    if let Some(mask) = graph.distance_1_error_mask {
        return Ok(dem_from_edges(&[Edge { nodes: Vec::new(), obs_mask: mask }]));
    }

    let mut prev: FxHashMap<StateKey, Origin> = FxHashMap::default();
    let mut queue: VecDeque<StateKey> = VecDeque::new();

    for node in 0..graph.num_nodes() as u64 {
        for edge in &graph.adjacency[node as usize] {
            if !edge.crosses_observable() || edge.nodes.len() > options.max_state_size {
                continue;
            }
            let key: StateKey = (edge.nodes.clone(), edge.obs_mask);
            prev.entry(key.clone()).or_insert_with(|| {
                queue.push_back(key.clone());
                Origin::Seed(edge.clone())
            });
        }
    }

    while let Some((nodes, mask)) = queue.pop_front() {
        if nodes.is_empty() {
            if mask != 0 {
                return Ok(dem_from_edges(&reconstruct((nodes, mask), &prev)));
            }
            continue;
        }
        for &n in &nodes {
            for edge in &graph.adjacency[n as usize] {
                let new_nodes = xor_node_sets(&nodes, &edge.nodes);
                if new_nodes.len() > options.max_state_size {
                    continue;
                }
                if options.monotonic_degree && new_nodes.len() > nodes.len() {
                    continue;
                }
                let new_mask = mask ^ edge.obs_mask;
                let key: StateKey = (new_nodes, new_mask);
                prev.entry(key.clone()).or_insert_with(|| {
                    queue.push_back(key.clone());
                    Origin::Step { from: (nodes.clone(), mask), edge: edge.clone() }
                });
            }
        }
    }

    log::debug!("hyper search exhausted {} states (max_state_size={}, max_edge_degree={}) without finding an undetectable logical error", prev.len(), options.max_state_size, options.max_edge_degree);
    Err(SearchError::NoUndetectableLogicalError)
}

fn reconstruct(mut state: StateKey, prev: &FxHashMap<StateKey, Origin>) -> Vec<Edge> {
    let mut edges = Vec::new();
    loop {
        match &prev[&state] {
            Origin::Seed(edge) => {
                edges.push(edge.clone());
                break;
            }
            Origin::Step { from, edge } => {
                edges.push(edge.clone());
                state = from.clone();
            }
        }
    }
    edges.reverse();
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use dem::parse_dem_text;

    #[test]
    fn matches_graphlike_result_when_restricted_to_degree_two() {
        let model =
            parse_dem_text("error(0.1) D0\nerror(0.1) D0 D1 L0\nerror(0.1) D1\n").unwrap();
        let options = HyperSearchOptions { max_state_size: 2, max_edge_degree: 2, monotonic_degree: false };
        let found = find_undetectable_logical_error(&model, &options).unwrap();
        assert_eq!(found.instructions().len(), 3);
    }

    #[test]
    fn distance_one_short_circuits_the_search() {
        let model = parse_dem_text("error(0.1) L0\nerror(0.2) D0 D1 D2 D3\n").unwrap();
        let options = HyperSearchOptions::default();
        let found = find_undetectable_logical_error(&model, &options).unwrap();
        assert_eq!(found.instructions().len(), 1);
    }

    #[test]
    fn monotonic_degree_cancels_a_four_detector_error_two_at_a_time() {
        // One weight-4 error touching D0..D3 and crossing L0, plus two
        // weight-2 errors each cancelling one adjacent pair.
        let model = parse_dem_text(
            "error(0.1) D0 D1 D2 D3 L0\nerror(0.1) D0 D1\nerror(0.1) D2 D3\n",
        )
        .unwrap();
        let options = HyperSearchOptions { max_state_size: 4, max_edge_degree: 4, monotonic_degree: true };
        let found = find_undetectable_logical_error(&model, &options).unwrap();
        assert_eq!(found.instructions().len(), 3);
    }
}
