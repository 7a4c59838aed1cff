use num_derive::{FromPrimitive, ToPrimitive};

/// Dense, bounded identifier for every gate the core understands. Kept
/// as a plain `#[repr(u16)]` enum rather than a class hierarchy so gate
/// dispatch is a single array index, per the "switch on a dense id"
/// design this crate is built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u16)]
pub enum GateId {
    I,
    X,
    Y,
    Z,
    H,
    HXY,
    HYZ,
    CXYZ,
    CZYX,
    Swap,
    ISwap,
    ISwapDag,
    CX,
    CY,
    CZ,
    XCX,
    XCY,
    XCZ,
    YCX,
    YCY,
    YCZ,
    M,
    MX,
    MY,
    R,
    RX,
    RY,
    MR,
    MRX,
    MRY,
    Mpp,
    XError,
    YError,
    ZError,
    Depolarize1,
    Depolarize2,
    PauliChannel1,
    PauliChannel2,
    HeraldedErase,
    HeraldedPauliChannel1,
    Detector,
    ObservableInclude,
    ShiftCoords,
    Tick,
    QubitCoords,
    Repeat,
}

impl GateId {
    pub const COUNT: usize = Self::Repeat as usize + 1;

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}
