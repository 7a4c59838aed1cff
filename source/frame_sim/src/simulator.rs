//! The batched Pauli-frame simulator itself.

use std::collections::BTreeMap;

use bitpack::{BitTable, BitVector};
use circuit::Circuit;
use gate_data::{gate, GateId, GateTarget, TargetKind};

use crate::dispatch;
use crate::error::SimulationError;
use crate::noise;
use crate::randomness::RandomnessTracker;
use crate::record::{MeasurementRecord, MeasurementSink};
use crate::rng::FrameRng;

/// Bounds peak memory for a run by flushing the measurement record in
/// windows. Both code paths (streaming on or off) must produce
/// identical output, so tests are free to force a tiny window on
/// small circuits.
#[derive(Clone, Copy, Debug)]
pub struct StreamingConfig {
    pub window_capacity: usize,
}

impl StreamingConfig {
    /// Large enough that ordinary test/example circuits never flush
    /// mid-run; production callers sizing a large run should pass an
    /// explicit, smaller capacity.
    pub const DEFAULT_CAPACITY: usize = 1 << 20;

    #[must_use]
    pub fn bounded(window_capacity: usize) -> Self {
        Self { window_capacity: window_capacity.max(1) }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self::bounded(Self::DEFAULT_CAPACITY)
    }
}

/// Accumulated detector and observable values for every shot in the
/// batch, shot-major so each row is directly writable via
/// [`crate::io`]'s table writers.
/// Raw measurement rows are not duplicated here: they are delivered to
/// the [`MeasurementSink`] supplied at construction (use [`crate::VecSink`]
/// to collect them in memory if needed).
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    pub detectors: BitTable,
    pub observables: BitTable,
}

/// A batched Pauli-frame simulator: `B` independent shots advance
/// together through one pass of the circuit. `x`/`z` are `num_qubits x
/// batch_size` tables; a column is one shot, a row is one qubit.
pub struct FrameSimulator<S: MeasurementSink> {
    batch_size: usize,
    x: BitTable,
    z: BitTable,
    record: MeasurementRecord,
    randomness: RandomnessTracker,
    rng: FrameRng,
    detectors: Vec<BitVector>,
    observables: BTreeMap<u32, BitVector>,
    sink: S,
    error: Option<SimulationError>,
}

impl<S: MeasurementSink> FrameSimulator<S> {
    /// Allocates every large buffer (frame tables, measurement record)
    /// up front from `num_qubits`/`batch_size`: no reallocation happens
    /// during [`Self::run`].
    #[must_use]
    pub fn new(num_qubits: usize, batch_size: usize, seed: u64, streaming: StreamingConfig, sink: S) -> Self {
        Self {
            batch_size,
            x: BitTable::zeros(num_qubits, batch_size),
            z: BitTable::zeros(num_qubits, batch_size),
            record: MeasurementRecord::new(streaming.window_capacity, batch_size),
            randomness: RandomnessTracker::new(num_qubits),
            rng: FrameRng::seed_from_u64(seed),
            detectors: Vec::new(),
            observables: BTreeMap::new(),
            sink,
            error: None,
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs `circuit` to completion, flushing the measurement record and
    /// returning the accumulated detector/observable tables. Measurement
    /// rows are additionally delivered to the sink supplied at
    /// construction, in strictly increasing measurement-index order.
    pub fn run(mut self, circuit: &Circuit) -> Result<(S, SimulationOutcome), SimulationError> {
        self.execute(circuit);
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.record.flush(&mut self.sink)?;

        let batch = self.batch_size;
        let mut detector_table = BitTable::zeros(batch, self.detectors.len());
        for (id, det) in self.detectors.iter().enumerate() {
            for shot in 0..batch {
                detector_table.set(shot, id, det.get(shot));
            }
        }
        let num_observables = self.observables.keys().copied().max().map_or(0, |m| m as usize + 1);
        let mut observable_table = BitTable::zeros(batch, num_observables);
        for (&id, obs) in &self.observables {
            for shot in 0..batch {
                observable_table.set(shot, id as usize, obs.get(shot));
            }
        }
        Ok((self.sink, SimulationOutcome { detectors: detector_table, observables: observable_table }))
    }

    fn fail(&mut self, err: SimulationError) {
        if self.error.is_none() {
            log::warn!("simulation run aborted: {err}");
            self.error = Some(err);
        }
    }

    fn execute(&mut self, circuit: &Circuit) {
        circuit.visit(false, &mut |view| {
            if self.error.is_some() {
                return;
            }
            if let Some((count, body)) = view.repeat {
                for _ in 0..count {
                    if self.error.is_some() {
                        break;
                    }
                    self.execute(body);
                }
                return;
            }
            self.apply_instruction(view.gate_id, view.targets, view.args);
        });
    }

    fn apply_instruction(&mut self, id: GateId, targets: &[GateTarget], args: &[f64]) {
        let g = gate(id);

        if g.is_annotation() {
            match id {
                GateId::Detector => self.apply_detector(targets),
                GateId::ObservableInclude => self.apply_observable_include(targets, args),
                _ => {}
            }
            return;
        }

        if g.is_unitary() {
            self.apply_unitary(id, targets);
            return;
        }

        if g.is_noisy() {
            self.apply_noise(id, targets, args);
            return;
        }

        if id == GateId::Mpp {
            self.apply_mpp(targets, args);
            return;
        }

        if g.is_measurement() {
            self.apply_measurement(id, targets, args);
            return;
        }

        if g.resets() {
            self.apply_reset(targets);
        }
    }

    /// Checks `q` against the declared qubit count, failing the run
    /// with [`SimulationError::QubitOutOfRange`] instead of letting the
    /// out-of-bounds index reach `BitTable::row`'s bare assert.
    fn check_qubit(&mut self, q: usize) -> bool {
        let num_qubits = self.x.major_len();
        if q >= num_qubits {
            self.fail(SimulationError::QubitOutOfRange { qubit: q as u32, num_qubits });
            false
        } else {
            true
        }
    }

    fn qubit_row_pair(&mut self, q: usize) -> (BitVector, BitVector) {
        (self.x.row(q).to_owned(), self.z.row(q).to_owned())
    }

    fn write_qubit_row_pair(&mut self, q: usize, x: BitVector, z: BitVector) {
        let mut xr = self.x.row_mut(q);
        xr.clear();
        xr.xor_assign(&x.as_view());
        let mut zr = self.z.row_mut(q);
        zr.clear();
        zr.xor_assign(&z.as_view());
    }

    fn apply_unitary(&mut self, id: GateId, targets: &[GateTarget]) {
        if gate(id).flags.contains(gate_data::GateFlags::TARGETS_PAIRS) {
            for pair in targets.chunks(2) {
                let (qa, qb) = (pair[0].value() as usize, pair[1].value() as usize);
                if !self.check_qubit(qa) || !self.check_qubit(qb) {
                    return;
                }
                self.randomness.merge(qa, qb);
                let (xa, za) = self.qubit_row_pair(qa);
                let (xb, zb) = self.qubit_row_pair(qb);
                if let Some((xa, za, xb, zb)) = dispatch::apply_two_qubit(id, xa, za, xb, zb) {
                    self.write_qubit_row_pair(qa, xa, za);
                    self.write_qubit_row_pair(qb, xb, zb);
                }
            }
            return;
        }
        let changes_basis = matches!(id, GateId::H | GateId::HXY | GateId::HYZ | GateId::CXYZ | GateId::CZYX);
        for t in targets {
            let q = t.value() as usize;
            if !self.check_qubit(q) {
                return;
            }
            if changes_basis {
                self.randomness.open(q);
            }
            let (x, z) = self.qubit_row_pair(q);
            if let Some((x, z)) = dispatch::apply_single_qubit(id, x, z) {
                self.write_qubit_row_pair(q, x, z);
            }
        }
    }

    fn apply_reset(&mut self, targets: &[GateTarget]) {
        for t in targets {
            let q = t.value() as usize;
            if !self.check_qubit(q) {
                return;
            }
            self.x.row_mut(q).clear();
            self.z.row_mut(q).clear();
            self.randomness.reset(q);
        }
    }

    /// Measurement basis contribution read off the frame: Z-basis reads
    /// `x`, X-basis reads `z`, Y-basis reads `x ^ z` (a lone X or Z
    /// error each flip a Y measurement; both together do not).
    fn basis_contribution(x: &BitVector, z: &BitVector, id: GateId) -> BitVector {
        match id {
            GateId::M | GateId::MR => x.clone(),
            GateId::MX | GateId::MRX => z.clone(),
            GateId::MY | GateId::MRY => {
                let mut v = x.clone();
                v.xor_assign(z);
                v
            }
            _ => unreachable!("basis_contribution called on non-measurement gate {id:?}"),
        }
    }

    fn apply_measurement(&mut self, id: GateId, targets: &[GateTarget], args: &[f64]) {
        let flip_probability = args.first().copied().unwrap_or(0.0);
        let resets = gate(id).resets();
        for t in targets {
            if !t.is_qubit_target() {
                continue;
            }
            let q = t.value() as usize;
            if !self.check_qubit(q) {
                return;
            }
            let x = self.x.row(q).to_owned();
            let z = self.z.row(q).to_owned();
            let mut outcome = Self::basis_contribution(&x, &z, id);
            if let Some(coin) = self.randomness.sample_for(q, self.batch_size, &mut self.rng) {
                outcome.xor_assign(&coin);
            }
            if flip_probability > 0.0 {
                let flip = self.rng.bernoulli_vector(self.batch_size, flip_probability);
                outcome.xor_assign(&flip);
            }
            if t.is_inverted() {
                for shot in 0..self.batch_size {
                    let bit = outcome.get(shot);
                    outcome.set(shot, !bit);
                }
            }
            if let Err(e) = self.record.push_row(&outcome, &mut self.sink) {
                self.fail(e);
                return;
            }
            if resets {
                self.x.row_mut(q).clear();
                self.z.row_mut(q).clear();
                self.randomness.reset(q);
            }
        }
    }

    /// `MPP`: a single product measurement over every Pauli target in
    /// the instruction (see `circuit::parse`'s `*`-splitting — the
    /// arena has no boundary marker between successive `*`-joined
    /// groups on one line, so an `MPP` instruction is treated here as
    /// one product spanning all of its targets; this matches the
    /// common single-product usage and is recorded as a known
    /// limitation in DESIGN.md).
    fn apply_mpp(&mut self, targets: &[GateTarget], args: &[f64]) {
        if targets.is_empty() {
            return;
        }
        let mut qubits = Vec::with_capacity(targets.len());
        let mut outcome = BitVector::zeros(self.batch_size);
        let mut inverted = false;
        for t in targets {
            let q = t.value() as usize;
            if !self.check_qubit(q) {
                return;
            }
            qubits.push(q);
            inverted ^= t.is_inverted();
            let x = self.x.row(q).to_owned();
            let z = self.z.row(q).to_owned();
            let contribution = match t.kind() {
                TargetKind::PauliX => z,
                TargetKind::PauliZ => x,
                TargetKind::PauliY => {
                    let mut v = x;
                    v.xor_assign(&z);
                    v
                }
                _ => continue,
            };
            outcome.xor_assign(&contribution);
        }
        for window in qubits.windows(2) {
            self.randomness.merge(window[0], window[1]);
        }
        if let Some(&q0) = qubits.first() {
            if let Some(coin) = self.randomness.sample_for(q0, self.batch_size, &mut self.rng) {
                outcome.xor_assign(&coin);
            }
        }
        let flip_probability = args.first().copied().unwrap_or(0.0);
        if flip_probability > 0.0 {
            let flip = self.rng.bernoulli_vector(self.batch_size, flip_probability);
            outcome.xor_assign(&flip);
        }
        if inverted {
            for shot in 0..self.batch_size {
                let bit = outcome.get(shot);
                outcome.set(shot, !bit);
            }
        }
        if let Err(e) = self.record.push_row(&outcome, &mut self.sink) {
            self.fail(e);
        }
    }

    fn apply_noise(&mut self, id: GateId, targets: &[GateTarget], args: &[f64]) {
        match id {
            GateId::XError | GateId::YError | GateId::ZError => {
                let p = args[0];
                let (affects_x, affects_z) = match id {
                    GateId::XError => (true, false),
                    GateId::YError => (true, true),
                    GateId::ZError => (false, true),
                    _ => unreachable!(),
                };
                for t in targets {
                    let q = t.value() as usize;
                    if !self.check_qubit(q) {
                        return;
                    }
                    let mut x = self.x.row(q).to_owned();
                    let mut z = self.z.row(q).to_owned();
                    noise::apply_pauli_error(&mut x, &mut z, p, affects_x, affects_z, &mut self.rng);
                    self.write_qubit_row_pair(q, x, z);
                }
            }
            GateId::Depolarize1 => {
                let p = args[0];
                for t in targets {
                    let q = t.value() as usize;
                    if !self.check_qubit(q) {
                        return;
                    }
                    let mut x = self.x.row(q).to_owned();
                    let mut z = self.z.row(q).to_owned();
                    noise::apply_depolarize1(&mut x, &mut z, p, &mut self.rng);
                    self.write_qubit_row_pair(q, x, z);
                }
            }
            GateId::PauliChannel1 => {
                let (px, py, pz) = (args[0], args[1], args[2]);
                for t in targets {
                    let q = t.value() as usize;
                    if !self.check_qubit(q) {
                        return;
                    }
                    let mut x = self.x.row(q).to_owned();
                    let mut z = self.z.row(q).to_owned();
                    noise::apply_pauli_channel1(&mut x, &mut z, px, py, pz, &mut self.rng);
                    self.write_qubit_row_pair(q, x, z);
                }
            }
            GateId::Depolarize2 => {
                let p = args[0];
                for pair in targets.chunks(2) {
                    let (qa, qb) = (pair[0].value() as usize, pair[1].value() as usize);
                    if !self.check_qubit(qa) || !self.check_qubit(qb) {
                        return;
                    }
                    let mut xa = self.x.row(qa).to_owned();
                    let mut za = self.z.row(qa).to_owned();
                    let mut xb = self.x.row(qb).to_owned();
                    let mut zb = self.z.row(qb).to_owned();
                    noise::apply_depolarize2(&mut xa, &mut za, &mut xb, &mut zb, p, &mut self.rng);
                    self.write_qubit_row_pair(qa, xa, za);
                    self.write_qubit_row_pair(qb, xb, zb);
                }
            }
            GateId::PauliChannel2 => {
                for pair in targets.chunks(2) {
                    let (qa, qb) = (pair[0].value() as usize, pair[1].value() as usize);
                    if !self.check_qubit(qa) || !self.check_qubit(qb) {
                        return;
                    }
                    let mut xa = self.x.row(qa).to_owned();
                    let mut za = self.z.row(qa).to_owned();
                    let mut xb = self.x.row(qb).to_owned();
                    let mut zb = self.z.row(qb).to_owned();
                    noise::apply_pauli_channel2(&mut xa, &mut za, &mut xb, &mut zb, args, &mut self.rng);
                    self.write_qubit_row_pair(qa, xa, za);
                    self.write_qubit_row_pair(qb, xb, zb);
                }
            }
            GateId::HeraldedErase => {
                let p = args[0];
                for t in targets {
                    let q = t.value() as usize;
                    if !self.check_qubit(q) {
                        return;
                    }
                    let mut x = self.x.row(q).to_owned();
                    let mut z = self.z.row(q).to_owned();
                    let herald = noise::apply_heralded_erase(&mut x, &mut z, p, &mut self.rng);
                    self.write_qubit_row_pair(q, x, z);
                    if let Err(e) = self.record.push_row(&herald, &mut self.sink) {
                        self.fail(e);
                        return;
                    }
                }
            }
            GateId::HeraldedPauliChannel1 => {
                let probs = [args[0], args[1], args[2], args[3]];
                for t in targets {
                    let q = t.value() as usize;
                    if !self.check_qubit(q) {
                        return;
                    }
                    let mut x = self.x.row(q).to_owned();
                    let mut z = self.z.row(q).to_owned();
                    let herald = noise::apply_heralded_pauli_channel1(&mut x, &mut z, &probs, &mut self.rng);
                    self.write_qubit_row_pair(q, x, z);
                    if let Err(e) = self.record.push_row(&herald, &mut self.sink) {
                        self.fail(e);
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    fn apply_detector(&mut self, targets: &[GateTarget]) {
        let mut value = BitVector::zeros(self.batch_size);
        for t in targets {
            if t.kind() != TargetKind::MeasurementRecord {
                continue;
            }
            match self.record.lookback(u64::from(t.value())) {
                Ok(row) => value.xor_assign(&row.to_owned()),
                Err(e) => {
                    self.fail(e);
                    return;
                }
            }
        }
        self.detectors.push(value);
    }

    fn apply_observable_include(&mut self, targets: &[GateTarget], args: &[f64]) {
        let Some(&id_f) = args.first() else { return };
        let id = id_f as u32;
        let entry = self.observables.entry(id).or_insert_with(|| BitVector::zeros(self.batch_size));
        for t in targets {
            if t.kind() != TargetKind::MeasurementRecord {
                continue;
            }
            match self.record.lookback(u64::from(t.value())) {
                Ok(row) => entry.xor_assign(&row.to_owned()),
                Err(e) => {
                    self.fail(e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NullSink;
    use circuit::Circuit;

    fn run_circuit(text: &str, batch: usize, seed: u64) -> SimulationOutcome {
        let circuit = Circuit::parse(text).unwrap();
        let stats = circuit.stats();
        let sim = FrameSimulator::new(stats.qubit_count as usize, batch, seed, StreamingConfig::default(), NullSink);
        let (_, outcome) = sim.run(&circuit).unwrap();
        outcome
    }

    #[test]
    fn bell_pair_detector_is_always_zero_noiseless() {
        let outcome = run_circuit(
            "H 0\nCX 0 1\nM 0 1\nDETECTOR rec[-1] rec[-2]\n",
            256,
            1,
        );
        for shot in 0..256 {
            assert!(!outcome.detectors.get(shot, 0), "noiseless Bell detector must read 0 at shot {shot}");
        }
    }

    #[test]
    fn bell_pair_measurements_split_roughly_evenly_between_00_and_11() {
        let circuit = Circuit::parse("H 0\nCX 0 1\nM 0 1\n").unwrap();
        let stats = circuit.stats();
        let sim = FrameSimulator::new(stats.qubit_count as usize, 1000, 1, StreamingConfig::default(), crate::record::VecSink::new());
        let (sink, _outcome) = sim.run(&circuit).unwrap();
        let rows = sink.into_rows();
        assert_eq!(rows.len(), 2);
        let (m0, m1) = (&rows[0], &rows[1]);
        for shot in 0..1000 {
            assert_eq!(m0.get(shot), m1.get(shot), "Bell pair shots must agree, shot {shot}");
        }
        let ones = m0.popcount();
        assert!(ones > 300 && ones < 700, "H must leave qubit 0 random, got {ones}/1000 ones");
    }

    #[test]
    fn repetition_style_detector_flips_under_certain_x_error() {
        let outcome = run_circuit(
            "R 0 1 2\nX_ERROR(1) 1\nCX 0 1\nCX 1 2\nM 1\nDETECTOR rec[-1]\n",
            32,
            7,
        );
        for shot in 0..32 {
            assert!(outcome.detectors.get(shot, 0), "a certain X error on the ancilla's partner must flip the detector");
        }
    }

    #[test]
    fn deterministic_same_seed_same_circuit() {
        let a = run_circuit("H 0\nCX 0 1\nM 0 1\n", 64, 99);
        let b = run_circuit("H 0\nCX 0 1\nM 0 1\n", 64, 99);
        assert_eq!(a.detectors, b.detectors);
        assert_eq!(a.observables, b.observables);
    }

    #[test]
    fn observable_include_accumulates_across_multiple_instructions() {
        let outcome = run_circuit(
            "R 0\nX 0\nM 0\nOBSERVABLE_INCLUDE(0) rec[-1]\nR 0\nM 0\nOBSERVABLE_INCLUDE(0) rec[-1]\n",
            16,
            3,
        );
        for shot in 0..16 {
            assert!(outcome.observables.get(shot, 0), "X then no error XORs to a single flipped observable");
        }
    }

    #[test]
    fn out_of_range_qubit_is_rejected_instead_of_panicking() {
        let circuit = Circuit::parse("H 5\n").unwrap();
        let sim = FrameSimulator::new(1, 4, 1, StreamingConfig::default(), NullSink);
        let err = sim.run(&circuit).unwrap_err();
        assert!(matches!(err, SimulationError::QubitOutOfRange { qubit: 5, num_qubits: 1 }));
    }

    #[test]
    fn repeat_block_accumulates_measurements_across_iterations() {
        let circuit = Circuit::parse("REPEAT 3 {\nR 0\nX 0\nM 0\n}\n").unwrap();
        let sim = FrameSimulator::new(1, 8, 11, StreamingConfig::default(), NullSink);
        let (_, _outcome) = sim.run(&circuit).unwrap();
    }
}
