//! Batched Pauli-frame simulator.
//!
//! Every shot carries an independent `(x, z)` Pauli frame per qubit,
//! packed column-major across shots so a whole batch advances with one
//! xor per row. [`simulator::FrameSimulator`] consumes a
//! [`circuit::Circuit`] and drives [`dispatch`] (Clifford conjugation),
//! [`randomness`] (which measurements are coin flips vs. deterministic)
//! and [`record`] (the append-only measurement log) to produce sampled
//! measurements, detectors and observables.

mod dispatch;
mod error;
pub mod io;
mod noise;
mod randomness;
mod record;
mod rng;
mod simulator;

pub use error::SimulationError;
pub use record::{MeasurementRecord, MeasurementSink, NullSink, VecSink};
pub use rng::FrameRng;
pub use simulator::{FrameSimulator, SimulationOutcome, StreamingConfig};
