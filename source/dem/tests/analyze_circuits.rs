use circuit::Circuit;
use dem::{analyze, parse_dem_text, write_dem_text, AnalyzeOptions, DemInstruction};

fn analyze_text(text: &str) -> dem::DetectorErrorModel {
    let circuit = Circuit::parse(text).unwrap();
    analyze(&circuit, &AnalyzeOptions::default()).unwrap()
}

#[test]
fn noiseless_bell_pair_detector_has_no_error_instructions() {
    let dem = analyze_text("H 0\nCX 0 1\nM 0 1\nDETECTOR rec[-1] rec[-2]\n");
    assert_eq!(dem.num_detectors(), 1);
    let error_count = dem.instructions().iter().filter(|i| matches!(i, DemInstruction::Error { .. })).count();
    assert_eq!(error_count, 0, "a noiseless detector has nothing left to flip it");
}

#[test]
fn repetition_round_detector_is_sensitive_to_the_ancillas_neighbor() {
    let dem = analyze_text("R 0 1 2\nX_ERROR(0.01) 1\nCX 0 1\nCX 1 2\nM 1\nDETECTOR rec[-1]\n");
    assert_eq!(dem.num_detectors(), 1);
    let errors: Vec<_> = dem
        .instructions()
        .iter()
        .filter_map(|i| match i {
            DemInstruction::Error { probability, targets } => Some((*probability, targets.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert!((errors[0].0 - 0.01).abs() < 1e-12);
    assert_eq!(errors[0].1.len(), 1);
}

#[test]
fn two_independent_noise_sites_produce_two_errors() {
    let dem = analyze_text(
        "R 0 1 2 3\nX_ERROR(0.02) 1\nX_ERROR(0.03) 2\nCX 0 1\nCX 1 2\nCX 2 3\nM 1 2\nDETECTOR rec[-2]\nDETECTOR rec[-1]\n",
    );
    assert_eq!(dem.num_detectors(), 2);
    let error_count = dem.instructions().iter().filter(|i| matches!(i, DemInstruction::Error { .. })).count();
    assert_eq!(error_count, 2);
}

#[test]
fn analysis_survives_a_text_format_round_trip() {
    let dem = analyze_text("R 0 1 2\nX_ERROR(0.05) 1\nCX 0 1\nCX 1 2\nM 1\nDETECTOR rec[-1]\n");
    let text = write_dem_text(&dem);
    let reparsed = parse_dem_text(&text).unwrap();
    assert_eq!(reparsed, dem);
}

#[test]
fn gauge_detector_is_rejected_by_default() {
    let circuit = Circuit::parse("H 0\nM 0\nDETECTOR rec[-1]\n").unwrap();
    let err = analyze(&circuit, &AnalyzeOptions::default()).unwrap_err();
    matches!(err, dem::AnalysisError::GaugeDetector { .. });
}
