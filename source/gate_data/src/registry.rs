//! Static gate registry.
//!
//! The original gate table stores, per entry, function pointers into
//! the tableau simulator, the frame simulator, and the error analyzer —
//! a single static initializer owns all three because C++ compiles them
//! into one binary. A Rust workspace can't do that without a cyclic
//! crate dependency (`frame_sim`/`dem` already depend on `gate_data`),
//! so per the "avoid a cyclic definition" design note this crate is the
//! sole owner of gate *metadata* (name, arity, target shape, category
//! flags) and nothing else; `frame_sim::dispatch` and
//! `dem::analyzer::dispatch` each build their own `[GateId::COUNT]`
//! array of callbacks indexed by [`GateId`], consuming this registry's
//! flags to decide which callback a given id needs.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::flags::{ArgCount, GateFlags, TargetShape};
use crate::gate::Gate;
use crate::id::GateId;

/// Owns the dense `GateId -> Gate` table plus the name/alias hash.
pub struct GateRegistry {
    gates: Vec<Gate>,
    by_name: FxHashMap<&'static str, GateId>,
}

impl GateRegistry {
    #[must_use]
    pub fn get(&self, id: GateId) -> &Gate {
        &self.gates[id.index()]
    }

    /// Looks up a gate by its canonical name or any registered alias.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Gate> {
        self.by_name.get(name).map(|id| self.get(*id))
    }

    fn add_gate(&mut self, gate: Gate) {
        let slot = gate.id.index();
        debug_assert!(
            self.gates.len() <= slot || self.gates[slot].name.is_empty(),
            "duplicate registration for {:?}",
            gate.id
        );
        self.by_name.insert(gate.name, gate.id);
        self.gates[slot] = gate;
    }

    fn add_alias(&mut self, alias: &'static str, canonical: &'static str) {
        let id = *self
            .by_name
            .get(canonical)
            .unwrap_or_else(|| panic!("alias {alias} refers to unregistered gate {canonical}"));
        self.by_name.insert(alias, id);
    }
}

fn placeholder() -> Gate {
    Gate::new(GateId::I, "", ArgCount::exactly(0), TargetShape::None, GateFlags::empty())
}

/// Builds the full registry. Mirrors the original's split into one
/// initializer routine per gate family (`add_gate_data_pauli`,
/// `add_gate_data_hada`, ...).
fn build_registry() -> GateRegistry {
    let mut reg = GateRegistry {
        gates: vec![placeholder(); GateId::COUNT],
        by_name: FxHashMap::default(),
    };
    add_pauli(&mut reg);
    add_hadamard_like(&mut reg);
    add_period_3(&mut reg);
    add_swaps(&mut reg);
    add_two_qubit_cliffords(&mut reg);
    add_collapsing(&mut reg);
    add_mpp(&mut reg);
    add_noise_channels(&mut reg);
    add_annotations(&mut reg);
    add_blocks(&mut reg);
    reg
}

fn add_pauli(reg: &mut GateRegistry) {
    use GateFlags as F;
    reg.add_gate(Gate::new(GateId::I, "I", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_gate(Gate::new(GateId::X, "X", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_gate(Gate::new(GateId::Y, "Y", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_gate(Gate::new(GateId::Z, "Z", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
}

fn add_hadamard_like(reg: &mut GateRegistry) {
    use GateFlags as F;
    reg.add_gate(Gate::new(GateId::H, "H", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_alias("H_XZ", "H");
    reg.add_gate(Gate::new(GateId::HXY, "H_XY", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_gate(Gate::new(GateId::HYZ, "H_YZ", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
}

fn add_period_3(reg: &mut GateRegistry) {
    use GateFlags as F;
    reg.add_gate(Gate::new(GateId::CXYZ, "C_XYZ", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
    reg.add_gate(Gate::new(GateId::CZYX, "C_ZYX", ArgCount::exactly(0), TargetShape::SingleQubits, F::IS_UNITARY));
}

fn add_swaps(reg: &mut GateRegistry) {
    use GateFlags as F;
    let flags = F::IS_UNITARY | F::TARGETS_PAIRS;
    reg.add_gate(Gate::new(GateId::Swap, "SWAP", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::ISwap, "ISWAP", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::ISwapDag, "ISWAP_DAG", ArgCount::exactly(0), TargetShape::Pairs, flags));
}

fn add_two_qubit_cliffords(reg: &mut GateRegistry) {
    use GateFlags as F;
    let flags = F::IS_UNITARY | F::TARGETS_PAIRS;
    reg.add_gate(Gate::new(GateId::CX, "CX", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_alias("CNOT", "CX");
    reg.add_gate(Gate::new(GateId::CY, "CY", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::CZ, "CZ", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::XCX, "XCX", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::XCY, "XCY", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::XCZ, "XCZ", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::YCX, "YCX", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::YCY, "YCY", ArgCount::exactly(0), TargetShape::Pairs, flags));
    reg.add_gate(Gate::new(GateId::YCZ, "YCZ", ArgCount::exactly(0), TargetShape::Pairs, flags));
}

fn add_collapsing(reg: &mut GateRegistry) {
    use GateFlags as F;
    let measure = F::IS_MEASUREMENT | F::PRODUCES_RESULTS;
    let reset = F::RESETS;
    let measure_reset = measure | reset;
    // Measurement gates take an optional `before_measure_flip_probability`
    // argument; omitting it means p=0.
    let measure_args = ArgCount::range(0, 1);

    reg.add_gate(Gate::new(GateId::M, "M", measure_args, TargetShape::SingleQubits, measure));
    reg.add_alias("MZ", "M");
    reg.add_gate(Gate::new(GateId::MX, "MX", measure_args, TargetShape::SingleQubits, measure));
    reg.add_gate(Gate::new(GateId::MY, "MY", measure_args, TargetShape::SingleQubits, measure));

    reg.add_gate(Gate::new(GateId::R, "R", ArgCount::exactly(0), TargetShape::SingleQubits, reset));
    reg.add_alias("RZ", "R");
    reg.add_gate(Gate::new(GateId::RX, "RX", ArgCount::exactly(0), TargetShape::SingleQubits, reset));
    reg.add_gate(Gate::new(GateId::RY, "RY", ArgCount::exactly(0), TargetShape::SingleQubits, reset));

    reg.add_gate(Gate::new(GateId::MR, "MR", measure_args, TargetShape::SingleQubits, measure_reset));
    reg.add_alias("MRZ", "MR");
    reg.add_gate(Gate::new(GateId::MRX, "MRX", measure_args, TargetShape::SingleQubits, measure_reset));
    reg.add_gate(Gate::new(GateId::MRY, "MRY", measure_args, TargetShape::SingleQubits, measure_reset));
}

fn add_mpp(reg: &mut GateRegistry) {
    use GateFlags as F;
    reg.add_gate(Gate::new(
        GateId::Mpp,
        "MPP",
        ArgCount::range(0, 1),
        TargetShape::VectorOfPaulis,
        F::IS_MEASUREMENT | F::PRODUCES_RESULTS | F::IS_NOT_FUSABLE,
    ));
}

fn add_noise_channels(reg: &mut GateRegistry) {
    use GateFlags as F;
    let independent = F::IS_NOISY;
    let disjoint = F::IS_NOISY | F::ARGS_ARE_DISJOINT_PROBABILITIES;

    reg.add_gate(Gate::new(GateId::XError, "X_ERROR", ArgCount::exactly(1), TargetShape::SingleQubits, independent));
    reg.add_gate(Gate::new(GateId::YError, "Y_ERROR", ArgCount::exactly(1), TargetShape::SingleQubits, independent));
    reg.add_gate(Gate::new(GateId::ZError, "Z_ERROR", ArgCount::exactly(1), TargetShape::SingleQubits, independent));
    reg.add_gate(Gate::new(GateId::Depolarize1, "DEPOLARIZE1", ArgCount::exactly(1), TargetShape::SingleQubits, independent));
    reg.add_gate(Gate::new(GateId::Depolarize2, "DEPOLARIZE2", ArgCount::exactly(1), TargetShape::Pairs, independent));
    reg.add_gate(Gate::new(GateId::PauliChannel1, "PAULI_CHANNEL_1", ArgCount::exactly(3), TargetShape::SingleQubits, disjoint));
    reg.add_gate(Gate::new(GateId::PauliChannel2, "PAULI_CHANNEL_2", ArgCount::exactly(15), TargetShape::Pairs, disjoint));
    reg.add_gate(Gate::new(
        GateId::HeraldedErase,
        "HERALDED_ERASE",
        ArgCount::exactly(1),
        TargetShape::SingleQubits,
        independent | F::PRODUCES_RESULTS,
    ));
    reg.add_gate(Gate::new(
        GateId::HeraldedPauliChannel1,
        "HERALDED_PAULI_CHANNEL_1",
        ArgCount::exactly(4),
        TargetShape::SingleQubits,
        disjoint | F::PRODUCES_RESULTS,
    ));
}

fn add_annotations(reg: &mut GateRegistry) {
    use GateFlags as F;
    let annotation = F::IS_ANNOTATION | F::IS_NOT_FUSABLE;
    reg.add_gate(Gate::new(GateId::Detector, "DETECTOR", ArgCount::range(0, usize::MAX), TargetShape::AnyReferences, annotation));
    reg.add_gate(Gate::new(
        GateId::ObservableInclude,
        "OBSERVABLE_INCLUDE",
        ArgCount::exactly(1),
        TargetShape::AnyReferences,
        annotation,
    ));
    reg.add_gate(Gate::new(GateId::ShiftCoords, "SHIFT_COORDS", ArgCount::range(0, usize::MAX), TargetShape::None, annotation));
    reg.add_gate(Gate::new(GateId::Tick, "TICK", ArgCount::exactly(0), TargetShape::None, annotation));
    reg.add_gate(Gate::new(
        GateId::QubitCoords,
        "QUBIT_COORDS",
        ArgCount::range(0, usize::MAX),
        TargetShape::SingleQubits,
        annotation,
    ));
}

fn add_blocks(reg: &mut GateRegistry) {
    use GateFlags as F;
    reg.add_gate(Gate::new(
        GateId::Repeat,
        "REPEAT",
        ArgCount::exactly(0),
        TargetShape::RepeatCount,
        F::IS_BLOCK | F::IS_NOT_FUSABLE,
    ));
}

static REGISTRY: OnceLock<GateRegistry> = OnceLock::new();

/// Returns the process-wide gate registry, built on first use.
#[must_use]
pub fn registry() -> &'static GateRegistry {
    REGISTRY.get_or_init(build_registry)
}

/// Convenience wrapper over `registry().lookup(name)`.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Gate> {
    registry().lookup(name)
}

/// Convenience wrapper over `registry().get(id)`.
#[must_use]
pub fn gate(id: GateId) -> &'static Gate {
    registry().get(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gate_id_has_an_entry() {
        let reg = registry();
        for slot in &reg.gates {
            assert!(!slot.name.is_empty(), "unregistered gate slot {:?}", slot.id);
        }
    }

    #[test]
    fn aliases_resolve_to_canonical_id() {
        assert_eq!(lookup("H_XZ").unwrap().id, lookup("H").unwrap().id);
        assert_eq!(lookup("MZ").unwrap().id, lookup("M").unwrap().id);
        assert_eq!(lookup("CNOT").unwrap().id, lookup("CX").unwrap().id);
        assert_eq!(lookup("MRZ").unwrap().id, lookup("MR").unwrap().id);
    }

    #[test]
    fn repeat_is_block_and_not_fusable() {
        let repeat = lookup("REPEAT").unwrap();
        assert!(repeat.is_block());
        assert!(!repeat.is_fusable());
    }

    #[test]
    fn swap_like_gates_target_pairs() {
        for name in ["SWAP", "ISWAP", "ISWAP_DAG", "CX", "CZ"] {
            let gate = lookup(name).unwrap();
            assert_eq!(gate.target_shape, TargetShape::Pairs);
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("NOT_A_GATE").is_none());
    }
}
