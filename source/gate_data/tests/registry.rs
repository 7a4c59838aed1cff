use gate_data::{lookup, GateFlags, TargetShape};

#[test]
fn noise_channels_are_marked_noisy_and_carry_args() {
    for name in ["X_ERROR", "DEPOLARIZE1", "DEPOLARIZE2", "HERALDED_ERASE"] {
        let gate = lookup(name).unwrap_or_else(|| panic!("missing gate {name}"));
        assert!(gate.flags.contains(GateFlags::IS_NOISY));
        assert!(gate.args.contains(1));
    }
}

#[test]
fn mpp_targets_a_vector_of_paulis() {
    let mpp = lookup("MPP").unwrap();
    assert_eq!(mpp.target_shape, TargetShape::VectorOfPaulis);
    assert!(mpp.produces_results());
}

#[test]
fn annotations_never_fuse_and_never_measure() {
    for name in ["DETECTOR", "OBSERVABLE_INCLUDE", "SHIFT_COORDS", "TICK", "QUBIT_COORDS"] {
        let gate = lookup(name).unwrap();
        assert!(!gate.is_fusable());
        assert!(!gate.is_measurement());
    }
}

#[test]
fn combined_measure_reset_gates_carry_both_flags() {
    for name in ["MR", "MRX", "MRY", "MRZ"] {
        let gate = lookup(name).unwrap();
        assert!(gate.is_measurement());
        assert!(gate.resets());
    }
}
