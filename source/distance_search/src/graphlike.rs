//! Graphlike search (`D_max = 2`), grounded on
//! `original_source/src/stim/search/graphlike/min_distance.h`'s
//! `DemAdjGraphSearchState { det_active, det_held, obs_mask }`.
//!
//! A state tracks up to two currently-excited detectors. Crossing an
//! edge incident to either one toggles it: it cancels if the edge's
//! far end is the *other* tracked detector, otherwise the excitation
//! moves there. The canonical form always orders the smaller id into
//! `active`, so which of the two tracked detectors a later step
//! extends from is free to alternate — both ends of the forming chain
//! get explored over the course of the breadth-first search. The goal
//! is a state with no detector left excited and a non-zero observable
//! mask: an error set that cancels on every detector but still flips a
//! logical observable.

use std::collections::VecDeque;

use dem::DetectorErrorModel;
use rustc_hash::FxHashMap;

use crate::error::SearchError;
use crate::graph::{dem_from_edges, Edge, Graph, NO_DETECTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SearchState {
    active: u64,
    held: u64,
    obs_mask: u64,
}

impl SearchState {
    fn canonical(self) -> Self {
        if self.active > self.held {
            Self { active: self.held, held: self.active, obs_mask: self.obs_mask }
        } else {
            self
        }
    }

    fn is_undetected(self) -> bool {
        self.active == NO_DETECTOR && self.held == NO_DETECTOR
    }
}

enum Origin {
    Seed(Edge),
    Step { from: SearchState, edge: Edge },
}

/// Finds a minimum-size list of graphlike errors from `model` that form
/// an undetectable logical error.
///
/// An error is graphlike if it has at most 2 detector symptoms. The
/// pieces of a decomposed (`^`-joined) error count individually, same
/// as `algo.h`'s "components of composite errors ... are included in
/// the set of graphlike errors being considered".
///
/// `ignore_ungraphlike_errors` controls whether a symptom with more
/// than 2 detectors raises [`SearchError::UngraphlikeError`] or is
/// simply excluded from the search.
pub fn shortest_graphlike_undetectable_logical_error(
    model: &DetectorErrorModel,
    ignore_ungraphlike_errors: bool,
) -> Result<DetectorErrorModel, SearchError> {
    let graph = Graph::from_dem(model, 2, ignore_ungraphlike_errors)?;
    if let Some(mask) = graph.distance_1_error_mask {
        return Ok(dem_from_edges(&[Edge { nodes: Vec::new(), obs_mask: mask }]));
    }

    let mut prev: FxHashMap<SearchState, Origin> = FxHashMap::default();
    let mut queue: VecDeque<SearchState> = VecDeque::new();

    for node in 0..graph.num_nodes() as u64 {
        for edge in &graph.adjacency[node as usize] {
            if !edge.crosses_observable() {
                continue;
            }
            let other = edge.nodes.iter().copied().find(|&n| n != node).unwrap_or(NO_DETECTOR);
            let state = SearchState { active: other, held: node, obs_mask: edge.obs_mask }.canonical();
            prev.entry(state).or_insert_with(|| {
                queue.push_back(state);
                Origin::Seed(edge.clone())
            });
        }
    }

    while let Some(state) = queue.pop_front() {
        if state.is_undetected() {
            if state.obs_mask != 0 {
                return Ok(dem_from_edges(&reconstruct(state, &prev)));
            }
            continue;
        }
        for &node in &[state.active, state.held] {
            if node == NO_DETECTOR {
                continue;
            }
            let other_role = if node == state.active { state.held } else { state.active };
            for edge in &graph.adjacency[node as usize] {
                let other_node = edge.nodes.iter().copied().find(|&n| n != node).unwrap_or(NO_DETECTOR);
                let new_mask = state.obs_mask ^ edge.obs_mask;
                let new_state = if other_node == other_role {
                    SearchState { active: NO_DETECTOR, held: NO_DETECTOR, obs_mask: new_mask }
                } else {
                    SearchState { active: other_node, held: other_role, obs_mask: new_mask }.canonical()
                };
                prev.entry(new_state).or_insert_with(|| {
                    queue.push_back(new_state);
                    Origin::Step { from: state, edge: edge.clone() }
                });
            }
        }
    }

    log::debug!("graphlike search exhausted {} states without finding an undetectable logical error", prev.len());
    Err(SearchError::NoUndetectableLogicalError)
}

fn reconstruct(mut state: SearchState, prev: &FxHashMap<SearchState, Origin>) -> Vec<Edge> {
    let mut edges = Vec::new();
    loop {
        match &prev[&state] {
            Origin::Seed(edge) => {
                edges.push(edge.clone());
                break;
            }
            Origin::Step { from, edge } => {
                edges.push(edge.clone());
                state = *from;
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
    fn single_edge_crossing_observable_is_distance_one() {
        let model = parse_dem_text("error(0.2) L0\n").unwrap();
        let found = shortest_graphlike_undetectable_logical_error(&model, false).unwrap();
        assert_eq!(found.instructions().len(), 1);
    }

    #[test]
    fn three_edge_chain_gives_distance_three() {
        // boundary-D0, D0-D1 (crossing L0), D1-boundary: D0 and D1 are
        // each touched twice (cancel) while the middle edge crosses L0.
        let model =
            parse_dem_text("error(0.1) D0\nerror(0.1) D0 D1 L0\nerror(0.1) D1\n").unwrap();
        let found = shortest_graphlike_undetectable_logical_error(&model, false).unwrap();
        assert_eq!(found.instructions().len(), 3);
    }

    #[test]
    fn no_undetectable_error_is_reported() {
        let model = parse_dem_text("error(0.1) D0 D1\n").unwrap();
        assert_eq!(
            shortest_graphlike_undetectable_logical_error(&model, false),
            Err(SearchError::NoUndetectableLogicalError)
        );
    }

    #[test]
    fn ungraphlike_error_rejected_unless_ignored() {
        let model = parse_dem_text("error(0.1) D0 D1 D2 L0\n").unwrap();
        assert!(shortest_graphlike_undetectable_logical_error(&model, false).is_err());
        assert_eq!(
            shortest_graphlike_undetectable_logical_error(&model, true),
            Err(SearchError::NoUndetectableLogicalError)
        );
    }
}
