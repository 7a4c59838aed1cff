use thiserror::Error;

/// Recoverable errors from parsing, building or analyzing a
/// [`crate::DetectorErrorModel`]. Groups the parse/format and analysis
/// error kinds into one enum per crate, same as `circuit::CircuitError`.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("malformed DEM instruction line: {line:?}")]
    MalformedLine { line: String },

    #[error("unknown DEM instruction {name:?}")]
    UnknownInstruction { name: String },

    #[error("unterminated DEM repeat block: missing closing brace")]
    UnterminatedRepeatBlock,

    #[error("unexpected closing brace with no open repeat block")]
    UnmatchedClosingBrace,

    #[error("measurement-record lookback {lookback} exceeds the {recorded} measurements recorded so far")]
    RecordIndexOutOfBounds { lookback: u64, recorded: u64 },

    #[error("detector or observable citing measurement {measurement} is a gauge detector (not deterministic)")]
    GaugeDetector { measurement: u64 },

    #[error("error target {symptom:?} (weight {weight}) could not be decomposed into graphlike pieces")]
    DecompositionFailure { symptom: Vec<String>, weight: usize },

    #[error("noise channel components are not pairwise disjoint and their total probability {total} exceeds the approximation threshold {threshold}")]
    DisjointProbabilityOverThreshold { total: f64, threshold: f64 },

    #[error("repeat block body did not reach a fixed point across iterations; detector ids would not shift consistently")]
    NonConvergentRepeatBlock,

    #[error("result count {count} exceeds the capacity bound {bound} without streaming enabled")]
    CapacityExceeded { count: u64, bound: u64 },
}
