use circuit::Circuit;

#[test]
fn text_roundtrip_modulo_fusion() {
    let source = "H 0\nH 1\nCX 0 1\nM 0 1\n";
    let parsed = Circuit::parse(source).unwrap();
    let reparsed = Circuit::parse(&parsed.to_text()).unwrap();
    assert_eq!(parsed, reparsed);
}

#[test]
fn repetition_unrolling_matches_k_fold_concatenation() {
    let body = Circuit::parse("CX 0 1\nM 1\n").unwrap();
    let mut wrapped = Circuit::new();
    wrapped.append_from_text("REPEAT 5 {\nCX 0 1\nM 1\n}\n").unwrap();

    let expected = &body * 5;
    assert_eq!(wrapped.flatten(), expected.flatten());
}

#[test]
fn repeat_zero_rejected_at_parse_time() {
    let err = Circuit::parse("REPEAT 0 {\nM 0\n}\n").unwrap_err();
    assert_eq!(err.to_string(), "REPEAT blocks require a repetition count >= 1, got 0");
}

#[test]
fn nested_repeat_blocks_parse_and_flatten() {
    let circuit = Circuit::parse("REPEAT 2 {\nREPEAT 3 {\nX 0\n}\nM 0\n}\n").unwrap();
    let flat = circuit.flatten();
    assert_eq!(flat.instruction_count(), 4);
    let stats = circuit.stats();
    assert_eq!(stats.measurement_count, 2);
}
