use gate_data::GateId;

/// One REPEAT block's repetition count plus the index of its body inside
/// the owning [`crate::Circuit`]'s `sub_circuits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatBlock {
    pub count: u64,
    pub body: usize,
}

/// A single gate invocation. Target and argument data live in the
/// owning [`crate::Circuit`]'s arenas; this struct holds only
/// `(offset, length)` slices into them, the same "jagged data in one
/// arena, views everywhere else" shape `VectorView`/`JaggedDataArena`
/// give the original's `Circuit`. This keeps an `Instruction` cheap to
/// copy and stable across further appends to the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub gate_id: GateId,
    pub(crate) targets_offset: u32,
    pub(crate) targets_len: u32,
    pub(crate) args_offset: u32,
    pub(crate) args_len: u32,
    pub tag: Option<Box<str>>,
    pub repeat: Option<RepeatBlock>,
}

impl Instruction {
    pub(crate) fn target_range(&self) -> std::ops::Range<usize> {
        let start = self.targets_offset as usize;
        start..start + self.targets_len as usize
    }

    pub(crate) fn arg_range(&self) -> std::ops::Range<usize> {
        let start = self.args_offset as usize;
        start..start + self.args_len as usize
    }
}
