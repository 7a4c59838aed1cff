//! Integration coverage for a distance-3 repetition code: analyzing a
//! noisy repetition-code memory circuit and searching the resulting
//! DEM recovers the code distance.

use circuit::Circuit;
use dem::{analyze, AnalyzeOptions};
use distance_search::shortest_graphlike_undetectable_logical_error;

/// A minimal distance-3 repetition code memory circuit: 3 data qubits
/// (0,2,4) and 2 ancillas (1,3) measured over 2 rounds, with a single
/// noise site on the last round so the detector graph forms one clean
/// boundary-to-boundary chain.
fn distance_three_memory_circuit() -> Circuit {
    Circuit::parse(
        "R 0 1 2 3 4\n\
         CX 0 1\nCX 2 1\nCX 2 3\nCX 4 3\n\
         M 1 3\n\
         DETECTOR rec[-2]\n\
         DETECTOR rec[-1]\n\
         X_ERROR(0.1) 0\n\
         CX 0 1\nCX 2 1\nCX 2 3\nCX 4 3\n\
         M 1 3\n\
         DETECTOR rec[-4] rec[-2]\n\
         DETECTOR rec[-3] rec[-1]\n\
         M 0 2 4\n\
         OBSERVABLE_INCLUDE(0) rec[-1]\n\
         DETECTOR rec[-2] rec[-5]\n\
         DETECTOR rec[-1] rec[-4]\n",
    )
    .unwrap()
}

#[test]
fn single_data_qubit_error_gives_a_two_detector_graphlike_symptom() {
    let circuit = distance_three_memory_circuit();
    let dem = analyze(&circuit, &AnalyzeOptions::default()).unwrap();
    let error_count =
        dem.instructions().iter().filter(|i| matches!(i, dem::DemInstruction::Error { .. })).count();
    assert_eq!(error_count, 1, "the single X_ERROR site is the only noise source");
}

#[test]
fn graphlike_search_finds_the_observable_crossing_chain() {
    // Three independent noise sites, one per data qubit, each flipping
    // a distinct pair of detectors along the chain; the logical error
    // requires flipping all three to cross the observable undetected.
    let circuit = Circuit::parse(
        "R 0 1 2 3 4\n\
         X_ERROR(0.01) 0\nX_ERROR(0.01) 2\nX_ERROR(0.01) 4\n\
         CX 0 1\nCX 2 1\nCX 2 3\nCX 4 3\n\
         M 1 3\n\
         DETECTOR rec[-2]\n\
         DETECTOR rec[-1]\n\
         M 0 2 4\n\
         OBSERVABLE_INCLUDE(0) rec[-1] rec[-2] rec[-3]\n",
    )
    .unwrap();
    let dem = analyze(&circuit, &AnalyzeOptions::default()).unwrap();
    let found = shortest_graphlike_undetectable_logical_error(&dem, false).unwrap();
    assert_eq!(found.instructions().len(), 3);
}
