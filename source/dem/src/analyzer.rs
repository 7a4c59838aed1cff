//! The backward symbolic error analyzer: turns a circuit plus its
//! annotations into a [`DetectorErrorModel`].
//!
//! A forward pass first walks the circuit once to assign detector ids
//! in encounter order, fold `SHIFT_COORDS` into subsequent detector
//! coordinates, and resolve every `rec[-k]` reference to an absolute
//! measurement index. A second, backward pass then walks the circuit in
//! reverse maintaining, per qubit, the set of detectors/observables
//! currently sensitive to an X error and to a Z error on that qubit
//! (`X_sensitivity`/`Z_sensitivity`), pushing those sets back through
//! each unitary's [`crate::reverse`] conjugation rule, consuming them at
//! measurements, and emitting one `error(p) ...` instruction per noise
//! channel component encountered along the way.
//!
//! Nested `repeat` blocks are flattened before analysis (see
//! `circuit::Circuit::flatten`); this analyzer never re-folds the
//! result back into a `repeat { ... }` block of its own; `distance
//! search` and downstream decoders only need the flat instruction
//! stream, and the fold-back is a enough of a distinct search problem
//! (matching up per-round coordinate/id shifts) that it is left for a
//! future pass rather than guessed at here.

use std::collections::HashMap;

use circuit::Circuit;
use gate_data::{gate, GateFlags, GateId, GateTarget, TargetKind};

use crate::decompose::GraphlikePool;
use crate::error::AnalysisError;
use crate::model::{DemInstruction, DetectorErrorModel};
use crate::reverse;
use crate::target::DemTarget;
use crate::target_set::DemTargetSet;

/// How a gauge detector should be handled: a detector or observable
/// whose declared parity depends on an unresolved random coin flip
/// (introduced by a basis-changing gate such as `H` that a later
/// measurement draws on, the same randomness a frame simulator would
/// sample per group of merged qubits) rather than purely on noise.
/// Such a detector never has deterministic parity in a noiseless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaugeDetectorPolicy {
    /// Fail the analysis with [`AnalysisError::GaugeDetector`].
    Reject,
    /// Keep whatever partial sensitivity remains, treating it as if the
    /// circuit began in a fixed known state.
    Allow,
    /// Silently drop the offending detector/observable from every error
    /// it appears in.
    Drop,
}

#[derive(Clone, Debug)]
pub struct AnalyzeOptions {
    /// Split each error's symptom into weight-&le;2 graphlike pieces
    /// joined by `^`, the form `distance_search` consumes directly.
    pub decompose_errors: bool,
    /// If a split can't be found and `decompose_errors` is set, emit
    /// the error undecomposed instead of failing.
    pub ignore_decomposition_failures: bool,
    /// Distinct noise events that land on the exact same symptom are
    /// combined via `p_new = p_a + p_b - 2*p_a*p_b` (the correct
    /// combination assuming independence). If the sum of the raw
    /// probabilities being combined exceeds this threshold the
    /// approximation is no longer trustworthy and analysis fails.
    pub approximate_disjoint_threshold: f64,
    pub gauge_detector_policy: GaugeDetectorPolicy,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            decompose_errors: false,
            ignore_decomposition_failures: false,
            approximate_disjoint_threshold: 1.0,
            gauge_detector_policy: GaugeDetectorPolicy::Reject,
        }
    }
}

/// Per-qubit sensitivity state threaded through the backward walk.
#[derive(Default)]
struct Sensitivities {
    x: HashMap<u32, DemTargetSet>,
    z: HashMap<u32, DemTargetSet>,
    herald: HashMap<u32, DemTargetSet>,
}

impl Sensitivities {
    fn x_of(&mut self, q: u32) -> DemTargetSet {
        self.x.remove(&q).unwrap_or_default()
    }

    fn z_of(&mut self, q: u32) -> DemTargetSet {
        self.z.remove(&q).unwrap_or_default()
    }

    fn set_x(&mut self, q: u32, set: DemTargetSet) {
        if !set.is_empty() {
            self.x.insert(q, set);
        }
    }

    fn set_z(&mut self, q: u32, set: DemTargetSet) {
        if !set.is_empty() {
            self.z.insert(q, set);
        }
    }

    fn xor_into_x(&mut self, q: u32, extra: &DemTargetSet) {
        let mut cur = self.x_of(q);
        cur.xor_assign(extra);
        self.set_x(q, cur);
    }

    fn xor_into_z(&mut self, q: u32, extra: &DemTargetSet) {
        let mut cur = self.z_of(q);
        cur.xor_assign(extra);
        self.set_z(q, cur);
    }

    fn xor_into_herald(&mut self, q: u32, extra: &DemTargetSet) {
        let mut cur = self.herald.remove(&q).unwrap_or_default();
        cur.xor_assign(extra);
        if !cur.is_empty() {
            self.herald.insert(q, cur);
        }
    }

    fn take_herald(&mut self, q: u32) -> DemTargetSet {
        self.herald.remove(&q).unwrap_or_default()
    }

    fn clear_qubit(&mut self, q: u32) {
        self.x.remove(&q);
        self.z.remove(&q);
    }
}

/// Mirrors `frame_sim::randomness::RandomnessTracker`'s group bookkeeping
/// symbolically, over a forward walk of the flattened op list, so the
/// analyzer can tell which measurements read a fresh, as-yet-undrawn
/// coin flip rather than the deterministic all-zero reference.
#[derive(Default)]
struct GaugeTracker {
    group: HashMap<u32, u64>,
    next_group: u64,
}

impl GaugeTracker {
    fn group_of(&self, q: u32) -> u64 {
        self.group.get(&q).copied().unwrap_or(0)
    }

    fn open(&mut self, q: u32) {
        if self.group_of(q) == 0 {
            self.next_group += 1;
            self.group.insert(q, self.next_group);
        }
    }

    fn merge(&mut self, a: u32, b: u32) {
        let (ga, gb) = (self.group_of(a), self.group_of(b));
        match (ga, gb) {
            (0, 0) => {}
            (0, _) => {
                self.group.insert(a, gb);
            }
            (_, 0) => {
                self.group.insert(b, ga);
            }
            _ if ga != gb => {
                for v in self.group.values_mut() {
                    if *v == gb {
                        *v = ga;
                    }
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self, q: u32) {
        self.group.insert(q, 0);
    }
}

/// XORs `listeners[idx]` (the detectors/observables that read this
/// measurement) into `q`'s randomness group's running contribution,
/// if `q` is currently in an open (non-deterministic) group.
fn record_gauge_contribution(
    contributions: &mut HashMap<u64, (u64, DemTargetSet)>,
    tracker: &GaugeTracker,
    q: u32,
    idx: u64,
    listeners: &HashMap<u64, DemTargetSet>,
) {
    let group = tracker.group_of(q);
    if group == 0 {
        return;
    }
    let Some(listener) = listeners.get(&idx) else { return };
    let entry = contributions.entry(group).or_insert_with(|| (idx, DemTargetSet::new()));
    entry.1.xor_assign(listener);
}

/// Finds every detector/observable whose value depends on an
/// undrawn coin flip (a gauge detector), by walking `ops` forward and
/// tracking, per randomness group, the XOR of every listener set read
/// by a measurement on a qubit in that group. A group's contribution
/// surviving to the end (not cancelled by an even number of same-group
/// measurements touching the same detector) makes every target in it
/// a true gauge detector/observable. Returns the earliest measurement
/// index implicated, for [`AnalysisError::GaugeDetector`], and the
/// union of every affected target across every group.
fn find_gauge_violations(ops: &[FlatOp], listeners: &HashMap<u64, DemTargetSet>) -> Option<(u64, DemTargetSet)> {
    let mut tracker = GaugeTracker::default();
    let mut contributions: HashMap<u64, (u64, DemTargetSet)> = HashMap::new();
    let mut next_measurement: u64 = 0;

    for op in ops {
        let g = gate(op.gate_id);
        if g.is_unitary() {
            if g.flags.contains(GateFlags::TARGETS_PAIRS) {
                for pair in op.targets.chunks(2) {
                    tracker.merge(pair[0].value(), pair[1].value());
                }
            } else if matches!(op.gate_id, GateId::H | GateId::HXY | GateId::HYZ | GateId::CXYZ | GateId::CZYX) {
                for t in &op.targets {
                    tracker.open(t.value());
                }
            }
            continue;
        }
        if g.resets() && op.gate_id != GateId::Mpp && !g.is_measurement() {
            for t in &op.targets {
                tracker.reset(t.value());
            }
            continue;
        }
        if op.gate_id == GateId::Mpp {
            let qubits: Vec<u32> = op.targets.iter().filter(|t| t.is_qubit_target()).map(|t| t.value()).collect();
            for window in qubits.windows(2) {
                tracker.merge(window[0], window[1]);
            }
            let idx = next_measurement;
            next_measurement += 1;
            if let Some(&q0) = qubits.first() {
                record_gauge_contribution(&mut contributions, &tracker, q0, idx, listeners);
            }
            continue;
        }
        if produces_measurement_rows(op.gate_id) {
            let resets = g.resets();
            for t in &op.targets {
                if !t.is_qubit_target() {
                    continue;
                }
                let idx = next_measurement;
                next_measurement += 1;
                if g.is_measurement() {
                    record_gauge_contribution(&mut contributions, &tracker, t.value(), idx, listeners);
                    if resets {
                        tracker.reset(t.value());
                    }
                }
            }
        }
    }

    let mut representative = None;
    let mut union = Vec::new();
    for (idx, set) in contributions.into_values() {
        if set.is_empty() {
            continue;
        }
        representative = Some(representative.map_or(idx, |r: u64| r.min(idx)));
        for &target in set.iter() {
            if !union.contains(&target) {
                union.push(target);
            }
        }
    }
    representative.map(|measurement| (measurement, union.into_iter().collect()))
}

/// An instruction of the flattened circuit together with the absolute
/// indices of every measurement-producing target it emits, computed by
/// the forward pass so the backward pass can resolve `rec[-k]` without
/// re-scanning.
struct FlatOp {
    gate_id: GateId,
    targets: Vec<GateTarget>,
    args: Vec<f64>,
}

fn produces_measurement_rows(id: GateId) -> bool {
    let g = gate(id);
    g.is_measurement() || id == GateId::Mpp || (g.is_noisy() && g.produces_results())
}

/// Runs the forward pass: assigns detector ids and coordinates,
/// resolves every measurement-record reference to an absolute index,
/// and returns the flattened op list plus the listener map (absolute
/// measurement index -> detectors/observables sensitive to it).
fn forward_pass(circuit: &Circuit) -> Result<(Vec<FlatOp>, HashMap<u64, DemTargetSet>, Vec<(u64, Vec<f64>)>), AnalysisError> {
    let flattened = circuit.flatten();
    let mut ops = Vec::new();
    flattened.visit(true, &mut |view| {
        ops.push(FlatOp { gate_id: view.gate_id, targets: view.targets.to_vec(), args: view.args.to_vec() });
    });

    let mut listeners: HashMap<u64, DemTargetSet> = HashMap::new();
    let mut detector_meta = Vec::new();
    let mut shift = Vec::new();
    let mut measurement_count: u64 = 0;
    let mut next_detector_id: u64 = 0;

    for op in &ops {
        match op.gate_id {
            GateId::ShiftCoords => {
                for (i, &v) in op.args.iter().enumerate() {
                    if i >= shift.len() {
                        shift.push(0.0);
                    }
                    shift[i] += v;
                }
            }
            GateId::Detector => {
                let id = next_detector_id;
                next_detector_id += 1;
                let mut coords = op.args.clone();
                for (i, s) in shift.iter().enumerate() {
                    if i < coords.len() {
                        coords[i] += s;
                    }
                }
                detector_meta.push((id, coords));
                for t in &op.targets {
                    if t.kind() == TargetKind::MeasurementRecord {
                        let lookback = u64::from(t.value());
                        if lookback > measurement_count {
                            return Err(AnalysisError::RecordIndexOutOfBounds { lookback, recorded: measurement_count });
                        }
                        let abs = measurement_count - lookback;
                        listeners.entry(abs).or_default().xor_target(DemTarget::detector(id));
                    }
                }
            }
            GateId::ObservableInclude => {
                let Some(&id_f) = op.args.first() else { continue };
                let id = id_f as u64;
                for t in &op.targets {
                    if t.kind() == TargetKind::MeasurementRecord {
                        let lookback = u64::from(t.value());
                        if lookback > measurement_count {
                            return Err(AnalysisError::RecordIndexOutOfBounds { lookback, recorded: measurement_count });
                        }
                        let abs = measurement_count - lookback;
                        listeners.entry(abs).or_default().xor_target(DemTarget::observable(id));
                    }
                }
            }
            other if other == GateId::Mpp => {
                measurement_count += 1;
            }
            other if produces_measurement_rows(other) => {
                measurement_count += op.targets.iter().filter(|t| t.is_qubit_target()).count() as u64;
            }
            _ => {}
        }
    }

    Ok((ops, listeners, detector_meta))
}

/// Emits the 1-3 nontrivial single-qubit Pauli error components of a
/// channel at independent probabilities, skipping any component whose
/// symptom is empty (unobservable).
fn emit_single_qubit_components(
    out: &mut Vec<(f64, DemTargetSet)>,
    x_sens: &DemTargetSet,
    z_sens: &DemTargetSet,
    px: f64,
    py: f64,
    pz: f64,
) {
    if px > 0.0 && !x_sens.is_empty() {
        out.push((px, x_sens.clone()));
    }
    if pz > 0.0 && !z_sens.is_empty() {
        out.push((pz, z_sens.clone()));
    }
    if py > 0.0 {
        let mut y = x_sens.clone();
        y.xor_assign(z_sens);
        if !y.is_empty() {
            out.push((py, y));
        }
    }
}

/// The 15 nontrivial two-qubit Pauli outcomes in `PAULI_CHANNEL_2`'s
/// `IX,IY,IZ,XI,...,ZZ` argument order, mirroring
/// `frame_sim::noise`'s table of the same shape so the two crates
/// agree on which argument index is which Pauli pair.
const TWO_QUBIT_PAULIS: [(bool, bool, bool, bool); 15] = [
    (false, false, true, false),
    (false, false, true, true),
    (false, false, false, true),
    (true, false, false, false),
    (true, false, true, false),
    (true, false, true, true),
    (true, false, false, true),
    (true, true, false, false),
    (true, true, true, false),
    (true, true, true, true),
    (true, true, false, true),
    (false, true, false, false),
    (false, true, true, false),
    (false, true, true, true),
    (false, true, false, true),
];

#[allow(clippy::too_many_arguments)]
fn emit_two_qubit_components(
    out: &mut Vec<(f64, DemTargetSet)>,
    xa: &DemTargetSet,
    za: &DemTargetSet,
    xb: &DemTargetSet,
    zb: &DemTargetSet,
    probs: &[f64],
) {
    for (i, &(pxa, pza, pxb, pzb)) in TWO_QUBIT_PAULIS.iter().enumerate() {
        let p = probs[i];
        if p <= 0.0 {
            continue;
        }
        let mut symptom = DemTargetSet::new();
        if pxa {
            symptom.xor_assign(xa);
        }
        if pza {
            symptom.xor_assign(za);
        }
        if pxb {
            symptom.xor_assign(xb);
        }
        if pzb {
            symptom.xor_assign(zb);
        }
        if !symptom.is_empty() {
            out.push((p, symptom));
        }
    }
}

/// Combines independently-discovered contributions that land on the
/// exact same symptom via `p_new = p_a + p_b - 2*p_a*p_b`, the
/// probability that an odd number of independent events with
/// probabilities `p_a`,`p_b` fires.
fn merge_same_symptom(raw: Vec<(f64, DemTargetSet)>, threshold: f64) -> Result<Vec<(f64, DemTargetSet)>, AnalysisError> {
    let mut by_key: Vec<(Vec<DemTarget>, f64, f64)> = Vec::new();
    for (p, set) in raw {
        let key: Vec<DemTarget> = set.into_sorted_vec();
        if let Some(entry) = by_key.iter_mut().find(|(k, _, _)| *k == key) {
            entry.2 += p;
            if entry.2 > threshold {
                return Err(AnalysisError::DisjointProbabilityOverThreshold { total: entry.2, threshold });
            }
            entry.1 = entry.1 + p - 2.0 * entry.1 * p;
        } else {
            by_key.push((key, p, p));
        }
    }
    Ok(by_key.into_iter().map(|(key, p, _)| (p, key.into_iter().collect())).collect())
}

/// Runs the backward walk over the already forward-processed op list,
/// producing one `(probability, symptom)` pair per noise-channel
/// component it passes, in no particular order (callers sort the
/// final model).
fn backward_pass(
    ops: &[FlatOp],
    mut listeners: HashMap<u64, DemTargetSet>,
    options: &AnalyzeOptions,
) -> Result<Vec<(f64, DemTargetSet)>, AnalysisError> {
    if let Some((measurement, targets)) = find_gauge_violations(ops, &listeners) {
        match options.gauge_detector_policy {
            GaugeDetectorPolicy::Reject => {
                log::warn!("rejecting analysis: measurement {measurement} feeds a gauge detector ({targets:?})");
                return Err(AnalysisError::GaugeDetector { measurement });
            }
            GaugeDetectorPolicy::Drop => {
                log::debug!("dropping gauge detector ids fed by measurement {measurement}: {targets:?}");
                let drop_list: Vec<DemTarget> = targets.iter().copied().collect();
                for set in listeners.values_mut() {
                    for &target in &drop_list {
                        set.remove(target);
                    }
                }
            }
            GaugeDetectorPolicy::Allow => {
                log::debug!("allowing gauge detector ids fed by measurement {measurement}: {targets:?}");
            }
        }
    }

    let mut sens = Sensitivities::default();
    let mut raw_errors = Vec::new();
    let mut next_measurement = ops
        .iter()
        .map(|op| match op.gate_id {
            g if g == GateId::Mpp => 1,
            g if produces_measurement_rows(g) => op.targets.iter().filter(|t| t.is_qubit_target()).count() as u64,
            _ => 0,
        })
        .sum::<u64>();

    for op in ops.iter().rev() {
        let g = gate(op.gate_id);
        if g.is_annotation() || g.is_block() {
            continue;
        }
        if g.is_unitary() {
            if g.flags.contains(gate_data::GateFlags::TARGETS_PAIRS) {
                for pair in op.targets.chunks(2) {
                    let (qa, qb) = (pair[0].value(), pair[1].value());
                    let xa = sens.x_of(qa);
                    let za = sens.z_of(qa);
                    let xb = sens.x_of(qb);
                    let zb = sens.z_of(qb);
                    if let Some((xa, za, xb, zb)) = reverse::apply_two_qubit(op.gate_id, xa, za, xb, zb) {
                        sens.set_x(qa, xa);
                        sens.set_z(qa, za);
                        sens.set_x(qb, xb);
                        sens.set_z(qb, zb);
                    }
                }
            } else {
                for t in &op.targets {
                    let q = t.value();
                    let x = sens.x_of(q);
                    let z = sens.z_of(q);
                    if let Some((x, z)) = reverse::apply_single_qubit(op.gate_id, x, z) {
                        sens.set_x(q, x);
                        sens.set_z(q, z);
                    }
                }
            }
            continue;
        }

        if g.resets() && op.gate_id != GateId::Mpp && !g.is_measurement() {
            for t in &op.targets {
                sens.clear_qubit(t.value());
            }
            continue;
        }

        if op.gate_id == GateId::Mpp {
            next_measurement -= 1;
            let idx = next_measurement;
            let listener = listeners.remove(&idx).unwrap_or_default();
            for t in &op.targets {
                let q = t.value();
                match t.kind() {
                    TargetKind::PauliX => sens.xor_into_z(q, &listener),
                    TargetKind::PauliZ => sens.xor_into_x(q, &listener),
                    TargetKind::PauliY => {
                        sens.xor_into_x(q, &listener);
                        sens.xor_into_z(q, &listener);
                    }
                    _ => {}
                }
            }
            continue;
        }

        if g.is_measurement() {
            let resets = g.resets();
            for t in op.targets.iter().rev() {
                if !t.is_qubit_target() {
                    continue;
                }
                next_measurement -= 1;
                let idx = next_measurement;
                let q = t.value();
                if resets {
                    sens.clear_qubit(q);
                }
                let listener = listeners.remove(&idx).unwrap_or_default();
                match op.gate_id {
                    GateId::M | GateId::MR => sens.xor_into_x(q, &listener),
                    GateId::MX | GateId::MRX => sens.xor_into_z(q, &listener),
                    GateId::MY | GateId::MRY => {
                        sens.xor_into_x(q, &listener);
                        sens.xor_into_z(q, &listener);
                    }
                    _ => {}
                }
            }
            continue;
        }

        if g.is_noisy() {
            apply_noise_component(op, &mut sens, &mut listeners, &mut next_measurement, &mut raw_errors);
        }
    }

    // Every qubit's frame starts at a known, fixed all-zero reference
    // (`frame_sim::simulator::FrameSimulator::new` allocates `x`/`z` as
    // `BitTable::zeros`), so leftover sensitivity at the start of the
    // circuit is, on its own, fully determined and not evidence of a
    // gauge detector. The real gauge check already happened above,
    // before this walk started: `find_gauge_violations` mirrors
    // `frame_sim::randomness::RandomnessTracker` to find detectors that
    // depend on a measurement's undrawn coin flip rather than the
    // fixed reference state.
    Ok(raw_errors)
}

fn apply_noise_component(
    op: &FlatOp,
    sens: &mut Sensitivities,
    listeners: &mut HashMap<u64, DemTargetSet>,
    next_measurement: &mut u64,
    out: &mut Vec<(f64, DemTargetSet)>,
) {
    match op.gate_id {
        GateId::XError | GateId::YError | GateId::ZError => {
            let p = op.args[0];
            let (affects_x, affects_z) = match op.gate_id {
                GateId::XError => (true, false),
                GateId::YError => (true, true),
                GateId::ZError => (false, true),
                _ => unreachable!(),
            };
            for t in &op.targets {
                let q = t.value();
                let x = sens.x.get(&q).cloned().unwrap_or_default();
                let z = sens.z.get(&q).cloned().unwrap_or_default();
                let mut symptom = DemTargetSet::new();
                if affects_x {
                    symptom.xor_assign(&x);
                }
                if affects_z {
                    symptom.xor_assign(&z);
                }
                if !symptom.is_empty() {
                    out.push((p, symptom));
                }
            }
        }
        GateId::Depolarize1 => {
            let p = op.args[0] / 3.0;
            for t in &op.targets {
                let q = t.value();
                let x = sens.x.get(&q).cloned().unwrap_or_default();
                let z = sens.z.get(&q).cloned().unwrap_or_default();
                emit_single_qubit_components(out, &x, &z, p, p, p);
            }
        }
        GateId::PauliChannel1 => {
            let (px, py, pz) = (op.args[0], op.args[1], op.args[2]);
            for t in &op.targets {
                let q = t.value();
                let x = sens.x.get(&q).cloned().unwrap_or_default();
                let z = sens.z.get(&q).cloned().unwrap_or_default();
                emit_single_qubit_components(out, &x, &z, px, py, pz);
            }
        }
        GateId::Depolarize2 => {
            let share = op.args[0] / 15.0;
            let probs = [share; 15];
            for pair in op.targets.chunks(2) {
                let (qa, qb) = (pair[0].value(), pair[1].value());
                let xa = sens.x.get(&qa).cloned().unwrap_or_default();
                let za = sens.z.get(&qa).cloned().unwrap_or_default();
                let xb = sens.x.get(&qb).cloned().unwrap_or_default();
                let zb = sens.z.get(&qb).cloned().unwrap_or_default();
                emit_two_qubit_components(out, &xa, &za, &xb, &zb, &probs);
            }
        }
        GateId::PauliChannel2 => {
            for pair in op.targets.chunks(2) {
                let (qa, qb) = (pair[0].value(), pair[1].value());
                let xa = sens.x.get(&qa).cloned().unwrap_or_default();
                let za = sens.z.get(&qa).cloned().unwrap_or_default();
                let xb = sens.x.get(&qb).cloned().unwrap_or_default();
                let zb = sens.z.get(&qb).cloned().unwrap_or_default();
                emit_two_qubit_components(out, &xa, &za, &xb, &zb, &op.args);
            }
        }
        GateId::HeraldedErase => {
            let p = op.args[0];
            for t in &op.targets {
                let q = t.value();
                *next_measurement -= 1;
                let herald_listener = listeners.remove(&*next_measurement).unwrap_or_default();
                sens.xor_into_herald(q, &herald_listener);
                let herald = sens.take_herald(q);
                if !herald.is_empty() {
                    out.push((p, herald));
                }
                let x = sens.x.get(&q).cloned().unwrap_or_default();
                let z = sens.z.get(&q).cloned().unwrap_or_default();
                emit_single_qubit_components(out, &x, &z, p / 4.0, p / 4.0, p / 4.0);
            }
        }
        GateId::HeraldedPauliChannel1 => {
            let (p_i, p_x, p_y, p_z) = (op.args[0], op.args[1], op.args[2], op.args[3]);
            let p_total = p_i + p_x + p_y + p_z;
            for t in &op.targets {
                let q = t.value();
                *next_measurement -= 1;
                let herald_listener = listeners.remove(&*next_measurement).unwrap_or_default();
                sens.xor_into_herald(q, &herald_listener);
                let herald = sens.take_herald(q);
                if !herald.is_empty() && p_total > 0.0 {
                    out.push((p_total, herald));
                }
                let x = sens.x.get(&q).cloned().unwrap_or_default();
                let z = sens.z.get(&q).cloned().unwrap_or_default();
                emit_single_qubit_components(out, &x, &z, p_x, p_y, p_z);
            }
        }
        _ => {}
    }
}

/// Analyzes `circuit` into a [`DetectorErrorModel`] per the rules
/// described at the module level.
pub fn analyze(circuit: &Circuit, options: &AnalyzeOptions) -> Result<DetectorErrorModel, AnalysisError> {
    let (ops, listeners, detector_meta) = forward_pass(circuit)?;
    let raw_errors = backward_pass(&ops, listeners, options)?;
    let merged = merge_same_symptom(raw_errors, options.approximate_disjoint_threshold)?;

    let mut pool = GraphlikePool::new();
    let mut error_instructions = Vec::new();
    for (p, set) in merged {
        if p <= 0.0 {
            continue;
        }
        if options.decompose_errors {
            match pool.decompose(&set) {
                Some(pieces) => {
                    let mut targets = Vec::new();
                    for (i, piece) in pieces.iter().enumerate() {
                        if i > 0 {
                            targets.push(DemTarget::separator());
                        }
                        targets.extend(piece.iter().copied());
                    }
                    error_instructions.push((p, targets));
                }
                None if options.ignore_decomposition_failures => {
                    log::debug!("keeping undecomposed error, weight {}: decomposition found no graphlike split", set.len());
                    error_instructions.push((p, set.into_sorted_vec()));
                }
                None => {
                    let weight = set.iter().filter(|t| t.is_detector()).count();
                    let symptom = set.iter().map(ToString::to_string).collect();
                    return Err(AnalysisError::DecompositionFailure { symptom, weight });
                }
            }
        } else {
            error_instructions.push((p, set.into_sorted_vec()));
        }
    }
    error_instructions.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.partial_cmp(&b.0).unwrap()));

    let mut model = DetectorErrorModel::new();
    for (id, coords) in detector_meta {
        model.push(DemInstruction::Detector { coords, id });
    }
    for (probability, targets) in error_instructions {
        model.push(DemInstruction::Error { probability, targets });
    }
    Ok(model)
}
