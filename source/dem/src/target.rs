use std::fmt;

const KIND_BITS: u64 = 2;
const KIND_SHIFT: u64 = 64 - KIND_BITS;
const VALUE_MASK: u64 = (1 << KIND_SHIFT) - 1;

const DETECTOR_TAG: u64 = 0 << KIND_SHIFT;
const OBSERVABLE_TAG: u64 = 1 << KIND_SHIFT;
const SEPARATOR_TAG: u64 = 2 << KIND_SHIFT;
const KIND_MASK: u64 = 0b11 << KIND_SHIFT;

/// Which of the three namespaces a [`DemTarget`] names: detector-id,
/// observable-id, or separator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemTargetKind {
    Detector,
    Observable,
    Separator,
}

/// A 64-bit tagged integer naming a detector, a logical observable, or
/// the `^` decomposition separator, packed the same "tag the top bits"
/// way `gate_data::GateTarget` packs its flag nibble over a 26-bit
/// value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DemTarget(u64);

impl DemTarget {
    /// # Panics
    ///
    /// Panics if `id` does not fit in 62 bits.
    #[must_use]
    pub fn detector(id: u64) -> Self {
        assert!(id <= VALUE_MASK, "detector id overflows 62-bit field");
        Self(DETECTOR_TAG | id)
    }

    /// # Panics
    ///
    /// Panics if `id` does not fit in 62 bits.
    #[must_use]
    pub fn observable(id: u64) -> Self {
        assert!(id <= VALUE_MASK, "observable id overflows 62-bit field");
        Self(OBSERVABLE_TAG | id)
    }

    #[must_use]
    pub fn separator() -> Self {
        Self(SEPARATOR_TAG)
    }

    #[must_use]
    pub fn kind(&self) -> DemTargetKind {
        match self.0 & KIND_MASK {
            DETECTOR_TAG => DemTargetKind::Detector,
            OBSERVABLE_TAG => DemTargetKind::Observable,
            _ => DemTargetKind::Separator,
        }
    }

    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.kind() == DemTargetKind::Separator
    }

    #[must_use]
    pub fn is_detector(&self) -> bool {
        self.kind() == DemTargetKind::Detector
    }

    #[must_use]
    pub fn is_observable(&self) -> bool {
        self.kind() == DemTargetKind::Observable
    }

    /// The detector or observable id; meaningless for a separator.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0 & VALUE_MASK
    }
}

impl fmt::Debug for DemTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for DemTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            DemTargetKind::Detector => write!(f, "D{}", self.id()),
            DemTargetKind::Observable => write!(f, "L{}", self.id()),
            DemTargetKind::Separator => write!(f, "^"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn detector_and_observable_round_trip() {
        let d = DemTarget::detector(5);
        assert_eq!(d.kind(), DemTargetKind::Detector);
        assert_eq!(d.id(), 5);
        let o = DemTarget::observable(2);
        assert_eq!(o.kind(), DemTargetKind::Observable);
        assert_eq!(o.id(), 2);
    }

    #[test]
    fn display_matches_text_format() {
        let dump = format!("{} {} {}", DemTarget::detector(3), DemTarget::observable(1), DemTarget::separator());
        expect![[r#"D3 L1 ^"#]].assert_eq(&dump);
    }

    #[test]
    fn ordering_groups_by_kind_then_id() {
        let mut targets = vec![DemTarget::observable(0), DemTarget::detector(5), DemTarget::detector(1)];
        targets.sort();
        assert_eq!(targets, vec![DemTarget::detector(1), DemTarget::detector(5), DemTarget::observable(0)]);
    }
}
