//! Distance search: find the smallest set of independent error
//! mechanisms in a [`dem::DetectorErrorModel`] that flips no detectors
//! but flips at least one logical observable (the code distance).
//!
//! Two modes share [`graph::Graph`], the adjacency-list view of a DEM's
//! flattened error instructions as hyperedges over detector ids:
//! [`shortest_graphlike_undetectable_logical_error`] breadth-first
//! searches `(active, held, obs_mask)` states restricted to degree-&le;2
//! edges (the shape matching decoders need), while
//! [`find_undetectable_logical_error`] generalizes to arbitrary
//! detector-set states under the three truncation knobs of
//! [`HyperSearchOptions`].

mod error;
mod graph;
mod graphlike;
mod hyper;

pub use error::SearchError;
pub use graph::{dem_from_edges, Edge, Graph, NO_DETECTOR};
pub use graphlike::shortest_graphlike_undetectable_logical_error;
pub use hyper::{find_undetectable_logical_error, HyperSearchOptions};
