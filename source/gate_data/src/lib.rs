//! Gate metadata: names, aliases, target shapes, category flags.
//!
//! This is the single source of truth `circuit` validates instructions
//! against and `frame_sim`/`dem` key their own per-gate dispatch tables
//! off of. See [`registry`] for why the function-pointer callback slots
//! of the original gate table are not reproduced here.

mod flags;
mod gate;
mod id;
mod registry;
mod target;

pub use flags::{ArgCount, GateFlags, TargetShape};
pub use gate::Gate;
pub use id::GateId;
pub use registry::{gate, lookup, registry, GateRegistry};
pub use target::{GateTarget, TargetKind};
