use gate_data::{gate, lookup, GateId, GateTarget, TargetShape};

use crate::error::CircuitError;
use crate::instruction::{Instruction, RepeatBlock};

const MAX_REPEAT_COUNT: u64 = 1_000_000_000_000_000_000;

/// An ordered, possibly nested, sequence of gate invocations.
///
/// Holds a contiguous arena of [`GateTarget`]s and a contiguous arena of
/// `f64` parens-args into which every [`Instruction`] references by
/// `(offset, length)` slice, plus the list of sub-circuits that REPEAT
/// instructions' bodies point into. This is the arena-of-arenas layout
/// `original_source/src/simd/vector_view.h`'s `JaggedDataArena` uses for
/// the same "lots of small jagged slices, one owner" shape.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    target_arena: Vec<GateTarget>,
    float_arena: Vec<f64>,
    instructions: Vec<Instruction>,
    sub_circuits: Vec<Circuit>,
}

/// Summary statistics used to size buffers before simulating or
/// analyzing a circuit (frame tables, measurement record, arenas).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CircuitStats {
    pub qubit_count: u64,
    pub measurement_count: u64,
    pub detector_count: u64,
}

/// A borrowed view of one instruction, yielded by [`Circuit::visit`].
#[derive(Debug)]
pub struct InstructionRef<'a> {
    pub gate_id: GateId,
    pub targets: &'a [GateTarget],
    pub args: &'a [f64],
    pub tag: Option<&'a str>,
    pub repeat: Option<(u64, &'a Circuit)>,
}

impl Circuit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn targets_of(&self, instr: &Instruction) -> &[GateTarget] {
        &self.target_arena[instr.target_range()]
    }

    #[must_use]
    pub fn args_of(&self, instr: &Instruction) -> &[f64] {
        &self.float_arena[instr.arg_range()]
    }

    #[must_use]
    pub fn sub_circuit(&self, index: usize) -> &Circuit {
        &self.sub_circuits[index]
    }

    /// Parses `text` and appends the resulting instructions (REPEAT
    /// structure preserved) to `self`.
    pub fn append_from_text(&mut self, text: &str) -> Result<(), CircuitError> {
        let parsed = crate::parse::parse_circuit_text(text)?;
        self.append_raw_from(&parsed);
        Ok(())
    }

    /// Parses `text` as a standalone circuit.
    pub fn parse(text: &str) -> Result<Circuit, CircuitError> {
        crate::parse::parse_circuit_text(text)
    }

    /// Appends one instruction, validating it against the gate table.
    ///
    /// Attempts to fuse into the previous instruction first when gate,
    /// args and tag match and the gate permits fusion (keeps textual
    /// roundtrips compact).
    pub fn append(
        &mut self,
        name: &str,
        targets: &[GateTarget],
        args: &[f64],
        tag: Option<&str>,
    ) -> Result<(), CircuitError> {
        let gate = lookup(name).ok_or_else(|| CircuitError::UnknownGate { name: name.to_string() })?;

        if !gate.args.contains(args.len()) {
            return Err(CircuitError::ArgCountMismatch {
                gate: name.to_string(),
                expected: (gate.args.min, gate.args.max),
                got: args.len(),
            });
        }
        if gate.is_noisy() || gate.is_measurement() {
            for &value in args {
                if !(0.0..=1.0).contains(&value) {
                    return Err(CircuitError::ArgOutOfRange { gate: name.to_string(), value });
                }
            }
        }
        validate_target_shape(gate.target_shape, name, targets)?;

        if self.try_fuse(gate.id, args, tag) {
            let offset = self.target_arena.len();
            self.target_arena.extend_from_slice(targets);
            let instr = self.instructions.last_mut().expect("try_fuse only succeeds with a previous instruction");
            debug_assert_eq!(instr.targets_offset as usize + instr.targets_len as usize, offset);
            instr.targets_len += targets.len() as u32;
            return Ok(());
        }

        let targets_offset = self.target_arena.len() as u32;
        self.target_arena.extend_from_slice(targets);
        let args_offset = self.float_arena.len() as u32;
        self.float_arena.extend_from_slice(args);

        self.instructions.push(Instruction {
            gate_id: gate.id,
            targets_offset,
            targets_len: targets.len() as u32,
            args_offset,
            args_len: args.len() as u32,
            tag: tag.map(Box::from),
            repeat: None,
        });
        Ok(())
    }

    fn try_fuse(&self, gate_id: GateId, args: &[f64], tag: Option<&str>) -> bool {
        let Some(last) = self.instructions.last() else { return false };
        if last.gate_id != gate_id || last.repeat.is_some() {
            return false;
        }
        if !gate(gate_id).is_fusable() {
            return false;
        }
        if self.args_of(last) != args {
            return false;
        }
        last.tag.as_deref() == tag
    }

    /// Appends `REPEAT count { body }`. Rejects `count == 0` and counts
    /// above `10^18` (the `REPEAT` target grammar's `[1, 10^18]` range).
    pub fn append_repeat_block(&mut self, count: u64, body: Circuit) -> Result<(), CircuitError> {
        if count == 0 {
            return Err(CircuitError::EmptyRepeatBlock);
        }
        if count > MAX_REPEAT_COUNT {
            return Err(CircuitError::RepeatCountOutOfRange(count));
        }
        let body_index = self.sub_circuits.len();
        self.sub_circuits.push(body);
        self.instructions.push(Instruction {
            gate_id: GateId::Repeat,
            targets_offset: self.target_arena.len() as u32,
            targets_len: 0,
            args_offset: self.float_arena.len() as u32,
            args_len: 0,
            tag: None,
            repeat: Some(RepeatBlock { count, body: body_index }),
        });
        Ok(())
    }

    /// Visits every instruction in order. When `expand_repeats` is
    /// true, `REPEAT` bodies are visited inline `count` times each;
    /// otherwise a single [`InstructionRef`] carrying the repeat count
    /// and a reference to the body is yielded, preserving the loop as
    /// one event.
    pub fn visit<F: FnMut(InstructionRef<'_>)>(&self, expand_repeats: bool, visitor: &mut F) {
        for instr in &self.instructions {
            if let Some(block) = &instr.repeat {
                let body = &self.sub_circuits[block.body];
                if expand_repeats {
                    for _ in 0..block.count {
                        body.visit(true, visitor);
                    }
                } else {
                    visitor(InstructionRef {
                        gate_id: instr.gate_id,
                        targets: &[],
                        args: &[],
                        tag: None,
                        repeat: Some((block.count, body)),
                    });
                }
                continue;
            }
            visitor(InstructionRef {
                gate_id: instr.gate_id,
                targets: self.targets_of(instr),
                args: self.args_of(instr),
                tag: instr.tag.as_deref(),
                repeat: None,
            });
        }
    }

    /// Materializes a fully expanded copy with every `REPEAT` unrolled.
    #[must_use]
    pub fn flatten(&self) -> Circuit {
        let mut out = Circuit::new();
        self.visit(true, &mut |view| {
            out.append(gate(view.gate_id).name, view.targets, view.args, view.tag)
                .expect("a previously-valid instruction must re-validate");
        });
        out
    }

    /// Appends a structural copy of `other` to `self`: arenas are
    /// concatenated and REPEAT bodies carried over unflattened, as the
    /// spec's "arena copy" concatenation requires (contrast with
    /// [`Circuit::flatten`], which materializes loops away).
    pub fn append_raw_from(&mut self, other: &Circuit) {
        let target_base = self.target_arena.len() as u32;
        self.target_arena.extend_from_slice(&other.target_arena);
        let arg_base = self.float_arena.len() as u32;
        self.float_arena.extend_from_slice(&other.float_arena);
        let body_base = self.sub_circuits.len();
        self.sub_circuits.extend(other.sub_circuits.iter().cloned());

        for instr in &other.instructions {
            let mut copy = instr.clone();
            copy.targets_offset += target_base;
            copy.args_offset += arg_base;
            if let Some(block) = &mut copy.repeat {
                block.body += body_base;
            }
            self.instructions.push(copy);
        }
    }

    /// Renders the circuit back to its textual form. REPEAT blocks are
    /// preserved (not flattened) and indented one level per nesting.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(0, &mut out);
        out
    }

    fn write_text(&self, indent: usize, out: &mut String) {
        let pad = "    ".repeat(indent);
        for instr in &self.instructions {
            if let Some(block) = &instr.repeat {
                out.push_str(&pad);
                out.push_str(&format!("REPEAT {} {{\n", block.count));
                self.sub_circuits[block.body].write_text(indent + 1, out);
                out.push_str(&pad);
                out.push_str("}\n");
                continue;
            }
            out.push_str(&pad);
            out.push_str(gate(instr.gate_id).name);
            let args = self.args_of(instr);
            if !args.is_empty() {
                out.push('(');
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&format!("{a}"));
                }
                out.push(')');
            }
            if let Some(tag) = &instr.tag {
                out.push('[');
                out.push_str(tag);
                out.push(']');
            }
            for target in self.targets_of(instr) {
                out.push(' ');
                out.push_str(&target.to_string());
            }
            out.push('\n');
        }
    }

    /// Computes the qubit, measurement and detector counts used to size
    /// simulator/analyzer buffers up front.
    #[must_use]
    pub fn stats(&self) -> CircuitStats {
        let mut stats = CircuitStats::default();
        self.accumulate_stats(&mut stats);
        stats
    }

    fn accumulate_stats(&self, stats: &mut CircuitStats) {
        for instr in &self.instructions {
            if let Some(block) = &instr.repeat {
                let body = &self.sub_circuits[block.body];
                let mut body_stats = CircuitStats::default();
                body.accumulate_stats(&mut body_stats);
                stats.qubit_count = stats.qubit_count.max(body_stats.qubit_count);
                stats.measurement_count += body_stats.measurement_count * block.count;
                stats.detector_count += body_stats.detector_count * block.count;
                continue;
            }
            let g = gate(instr.gate_id);
            for target in self.targets_of(instr) {
                if target.is_qubit_target() {
                    stats.qubit_count = stats.qubit_count.max(u64::from(target.qubit_value()) + 1);
                }
            }
            if g.produces_results() {
                stats.measurement_count += self.targets_of(instr).iter().filter(|t| t.is_qubit_target()).count() as u64;
            }
            if instr.gate_id == GateId::Detector {
                stats.detector_count += 1;
            }
        }
    }
}

fn validate_target_shape(shape: TargetShape, gate_name: &str, targets: &[GateTarget]) -> Result<(), CircuitError> {
    let ok = match shape {
        TargetShape::SingleQubits => true,
        TargetShape::Pairs => targets.len() % 2 == 0,
        TargetShape::VectorOfPaulis => !targets.is_empty(),
        TargetShape::RepeatCount => targets.is_empty(),
        TargetShape::AnyReferences => true,
        TargetShape::None => targets.is_empty(),
    };
    if ok {
        Ok(())
    } else {
        Err(CircuitError::TargetShapeMismatch { gate: gate_name.to_string() })
    }
}

impl PartialEq for Circuit {
    fn eq(&self, other: &Self) -> bool {
        flattened_key(self) == flattened_key(other)
    }
}
impl Eq for Circuit {}

type FlatEntry = (GateId, Vec<GateTarget>, Vec<[u8; 8]>, Option<Box<str>>);
type FlatKey = Vec<FlatEntry>;

/// Equality key for a circuit: the flattened (REPEAT-expanded)
/// instruction stream, with every fusable instruction re-split to its
/// natural per-target or per-pair granularity. This makes two circuits
/// compare equal whenever the *only* difference between them is which
/// adjacent same-gate instructions happened to get fused on append —
/// a text roundtrip matches modulo fusion.
fn flattened_key(circuit: &Circuit) -> FlatKey {
    let mut out = Vec::new();
    circuit.visit(true, &mut |view| {
        let arg_bits: Vec<[u8; 8]> = view.args.iter().map(|a| a.to_bits().to_be_bytes()).collect();
        let tag = view.tag.map(Box::from);
        let chunk_size = match (gate(view.gate_id).is_fusable(), gate(view.gate_id).target_shape) {
            (true, TargetShape::Pairs) => 2,
            (true, _) => 1,
            (false, _) => usize::MAX,
        };
        if view.targets.is_empty() {
            out.push((view.gate_id, Vec::new(), arg_bits, tag));
        } else {
            for chunk in view.targets.chunks(chunk_size.min(view.targets.len())) {
                out.push((view.gate_id, chunk.to_vec(), arg_bits.clone(), tag.clone()));
            }
        }
    });
    out
}

impl std::ops::Add<&Circuit> for &Circuit {
    type Output = Circuit;

    fn add(self, rhs: &Circuit) -> Circuit {
        let mut out = self.clone();
        out.append_raw_from(rhs);
        out
    }
}

impl std::ops::Mul<u64> for &Circuit {
    type Output = Circuit;

    fn mul(self, times: u64) -> Circuit {
        let mut out = Circuit::new();
        for _ in 0..times {
            out.append_raw_from(self);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use gate_data::GateTarget;

    #[test]
    fn append_validates_unknown_gate() {
        let mut c = Circuit::new();
        let err = c.append("NOT_A_GATE", &[], &[], None).unwrap_err();
        assert_eq!(err, CircuitError::UnknownGate { name: "NOT_A_GATE".into() });
    }

    #[test]
    fn append_rejects_probability_out_of_range() {
        let mut c = Circuit::new();
        let err = c.append("X_ERROR", &[GateTarget::qubit(0)], &[1.5], None).unwrap_err();
        assert!(matches!(err, CircuitError::ArgOutOfRange { .. }));
    }

    #[test]
    fn fuses_adjacent_identical_instructions() {
        let mut c = Circuit::new();
        c.append("H", &[GateTarget::qubit(0)], &[], None).unwrap();
        c.append("H", &[GateTarget::qubit(1)], &[], None).unwrap();
        assert_eq!(c.instruction_count(), 1);
        expect![[r#"H 0 1
"#]]
        .assert_eq(&c.to_text());
    }

    #[test]
    fn repeat_zero_is_rejected() {
        let mut c = Circuit::new();
        let body = Circuit::new();
        let err = c.append_repeat_block(0, body).unwrap_err();
        assert_eq!(err, CircuitError::EmptyRepeatBlock);
    }

    #[test]
    fn flatten_unrolls_repeat_n_times() {
        let mut body = Circuit::new();
        body.append("X", &[GateTarget::qubit(0)], &[], None).unwrap();
        let mut wrapped = Circuit::new();
        wrapped.append_repeat_block(3, body.clone()).unwrap();

        let expected = &(&body * 3);
        assert_eq!(&wrapped.flatten(), expected);
    }

    #[test]
    fn equality_is_defined_over_flattened_view() {
        let mut a = Circuit::new();
        a.append("H", &[GateTarget::qubit(0)], &[], None).unwrap();
        let mut b = Circuit::new();
        b.append_repeat_block(1, a.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pairs_gate_rejects_odd_target_count() {
        let mut c = Circuit::new();
        let err = c.append("CX", &[GateTarget::qubit(0)], &[], None).unwrap_err();
        assert!(matches!(err, CircuitError::TargetShapeMismatch { .. }));
    }
}
