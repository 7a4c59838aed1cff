use crate::flags::{ArgCount, GateFlags, TargetShape};
use crate::id::GateId;

/// A single entry of the gate table: everything `circuit::Circuit` needs
/// to validate an instruction, and everything `frame_sim`/`dem` need to
/// know about a gate's category without depending on this crate's own
/// dispatch (there is none — see the module doc comment on
/// [`crate::registry`] for why the `apply_frame`/`analyze_error`
/// function-pointer slots the original gate table carries are not
/// reproduced here).
#[derive(Clone, Copy, Debug)]
pub struct Gate {
    pub id: GateId,
    pub name: &'static str,
    pub args: ArgCount,
    pub target_shape: TargetShape,
    pub flags: GateFlags,
}

impl Gate {
    #[must_use]
    pub const fn new(id: GateId, name: &'static str, args: ArgCount, target_shape: TargetShape, flags: GateFlags) -> Self {
        Self { id, name, args, target_shape, flags }
    }

    #[must_use]
    pub fn is_unitary(&self) -> bool {
        self.flags.contains(GateFlags::IS_UNITARY)
    }

    #[must_use]
    pub fn is_measurement(&self) -> bool {
        self.flags.contains(GateFlags::IS_MEASUREMENT)
    }

    #[must_use]
    pub fn resets(&self) -> bool {
        self.flags.contains(GateFlags::RESETS)
    }

    #[must_use]
    pub fn is_noisy(&self) -> bool {
        self.flags.contains(GateFlags::IS_NOISY)
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.flags.contains(GateFlags::IS_BLOCK)
    }

    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.flags.contains(GateFlags::IS_ANNOTATION)
    }

    #[must_use]
    pub fn is_fusable(&self) -> bool {
        !self.flags.contains(GateFlags::IS_NOT_FUSABLE)
    }

    #[must_use]
    pub fn produces_results(&self) -> bool {
        self.flags.contains(GateFlags::PRODUCES_RESULTS)
    }
}
