use bitflags::bitflags;

bitflags! {
    /// Semantic category bits attached to a [`crate::Gate`] record,
    /// mirroring the `GateFlags` enum in the original gate table.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GateFlags: u16 {
        /// Acts as a Clifford unitary on the tableau/frame.
        const IS_UNITARY                       = 1 << 0;
        /// Produces one classical result bit per target.
        const PRODUCES_RESULTS                 = 1 << 1;
        /// Collapses (measures) the targeted qubits.
        const IS_MEASUREMENT                   = 1 << 2;
        /// Resets the targeted qubits to a fixed state.
        const RESETS                           = 1 << 3;
        /// A stochastic Pauli-noise channel.
        const IS_NOISY                         = 1 << 4;
        /// The channel's parens args are disjoint-probability weights
        /// (they sum to at most 1 and select at most one outcome) as
        /// opposed to independent per-component probabilities.
        const ARGS_ARE_DISJOINT_PROBABILITIES  = 1 << 5;
        /// A structural block gate (only `REPEAT` today).
        const IS_BLOCK                         = 1 << 6;
        /// Adjacent instructions of this gate must never be fused.
        const IS_NOT_FUSABLE                   = 1 << 7;
        /// Pure metadata: no effect on the simulated state.
        const IS_ANNOTATION                    = 1 << 8;
        /// Targets come in qubit pairs (`SWAP`, two-qubit Cliffords).
        const TARGETS_PAIRS                    = 1 << 9;
    }
}

/// Shape that an instruction's target list must conform to, checked by
/// `circuit::Circuit::append` before an instruction is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetShape {
    /// Any number of independent single-qubit targets (`>= 1`).
    SingleQubits,
    /// Targets come in pairs that are consumed two at a time.
    Pairs,
    /// A `*`-joined vector of Pauli product terms (`MPP`).
    VectorOfPaulis,
    /// A single repetition count target (`REPEAT`).
    RepeatCount,
    /// Any number of measurement-record/sweep/qubit targets, used by
    /// annotations that list arbitrary references (`DETECTOR`,
    /// `OBSERVABLE_INCLUDE`).
    AnyReferences,
    /// No targets at all (`TICK`, `SHIFT_COORDS`).
    None,
}

/// Inclusive bounds on the number of float parens-arguments a gate
/// accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgCount {
    pub min: usize,
    pub max: usize,
}

impl ArgCount {
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    #[must_use]
    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }
}
