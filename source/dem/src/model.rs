use crate::target::DemTarget;

/// One instruction of a [`DetectorErrorModel`].
#[derive(Clone, Debug, PartialEq)]
pub enum DemInstruction {
    /// `error(p) T1 T2 ...`. `targets` may contain [`DemTarget::separator`]
    /// entries when `decompose_errors` split the symptom into graphlike
    /// pieces.
    Error { probability: f64, targets: Vec<DemTarget> },
    /// `detector(x,y,...) D<id>`, pure metadata.
    Detector { coords: Vec<f64>, id: u64 },
    /// `logical_observable L<id>`.
    LogicalObservable { id: u64 },
    /// `shift_detectors(dx,dy,...) k`.
    ShiftDetectors { coords: Vec<f64>, shift: u64 },
    /// `repeat k { ... }`.
    Repeat { count: u64, body: DetectorErrorModel },
}

/// A sequence of [`DemInstruction`]s: the pure-output artifact produced
/// by [`crate::analyzer::analyze`] or [`crate::distance`] searches, and
/// the type `parse`/`to_text` round-trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectorErrorModel {
    instructions: Vec<DemInstruction>,
}

impl DetectorErrorModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: DemInstruction) {
        self.instructions.push(instruction);
    }

    #[must_use]
    pub fn instructions(&self) -> &[DemInstruction] {
        &self.instructions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Materializes a copy with every `repeat` block unrolled, the DEM
    /// analogue of `circuit::Circuit::flatten`.
    #[must_use]
    pub fn flatten(&self) -> DetectorErrorModel {
        let mut out = DetectorErrorModel::new();
        flatten_into(&self.instructions, &mut out);
        out
    }

    /// One past the highest detector id named by either a `detector(...)`
    /// annotation or an error target, `0` if none.
    #[must_use]
    pub fn num_detectors(&self) -> u64 {
        let mut max_seen: Option<u64> = None;
        visit_detector_ids(&self.instructions, &mut |id| {
            max_seen = Some(max_seen.map_or(id, |m| m.max(id)));
        });
        max_seen.map_or(0, |m| m + 1)
    }

    /// One past the highest observable id named anywhere, `0` if none.
    #[must_use]
    pub fn num_observables(&self) -> u64 {
        let mut max_seen: Option<u64> = None;
        visit_observable_ids(&self.instructions, &mut |id| {
            max_seen = Some(max_seen.map_or(id, |m| m.max(id)));
        });
        max_seen.map_or(0, |m| m + 1)
    }
}

fn flatten_into(instructions: &[DemInstruction], out: &mut DetectorErrorModel) {
    for instr in instructions {
        match instr {
            DemInstruction::Repeat { count, body } => {
                for _ in 0..*count {
                    flatten_into(body.instructions(), out);
                }
            }
            other => out.push(other.clone()),
        }
    }
}

fn visit_detector_ids(instructions: &[DemInstruction], visitor: &mut impl FnMut(u64)) {
    for instr in instructions {
        match instr {
            DemInstruction::Detector { id, .. } => visitor(*id),
            DemInstruction::Error { targets, .. } => {
                for t in targets {
                    if t.is_detector() {
                        visitor(t.id());
                    }
                }
            }
            DemInstruction::Repeat { body, .. } => visit_detector_ids(body.instructions(), visitor),
            DemInstruction::LogicalObservable { .. } | DemInstruction::ShiftDetectors { .. } => {}
        }
    }
}

fn visit_observable_ids(instructions: &[DemInstruction], visitor: &mut impl FnMut(u64)) {
    for instr in instructions {
        match instr {
            DemInstruction::LogicalObservable { id } => visitor(*id),
            DemInstruction::Error { targets, .. } => {
                for t in targets {
                    if t.is_observable() {
                        visitor(t.id());
                    }
                }
            }
            DemInstruction::Repeat { body, .. } => visit_observable_ids(body.instructions(), visitor),
            DemInstruction::Detector { .. } | DemInstruction::ShiftDetectors { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_unrolls_nested_repeat() {
        let mut body = DetectorErrorModel::new();
        body.push(DemInstruction::Detector { coords: vec![], id: 0 });
        let mut dem = DetectorErrorModel::new();
        dem.push(DemInstruction::Repeat { count: 3, body });
        assert_eq!(dem.flatten().instructions().len(), 3);
    }

    #[test]
    fn num_detectors_counts_metadata_and_error_targets() {
        let mut dem = DetectorErrorModel::new();
        dem.push(DemInstruction::Detector { coords: vec![], id: 0 });
        dem.push(DemInstruction::Error { probability: 0.1, targets: vec![DemTarget::detector(4)] });
        assert_eq!(dem.num_detectors(), 5);
    }
}
