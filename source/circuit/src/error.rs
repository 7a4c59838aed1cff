use thiserror::Error;

/// Recoverable errors from parsing or building a [`crate::Circuit`].
///
/// Every variant corresponds to one of the parse/validation error kinds
/// called out by the core's error taxonomy: nothing here is fatal, and
/// every public entry point that can fail short-circuits with one of
/// these before mutating the circuit, leaving it in its prior state.
#[derive(Debug, Error, PartialEq)]
pub enum CircuitError {
    #[error("unknown gate {name:?}")]
    UnknownGate { name: String },

    #[error("malformed instruction line: {line:?}")]
    MalformedLine { line: String },

    #[error("gate {gate} expects {expected:?} parens args, got {got}")]
    ArgCountMismatch { gate: String, expected: (usize, usize), got: usize },

    #[error("gate {gate} argument {value} is outside the declared range")]
    ArgOutOfRange { gate: String, value: f64 },

    #[error("gate {gate} received a target shape it does not accept")]
    TargetShapeMismatch { gate: String },

    #[error("REPEAT blocks require a repetition count >= 1, got 0")]
    EmptyRepeatBlock,

    #[error("REPEAT count {0} is outside the allowed range [1, 10^18]")]
    RepeatCountOutOfRange(u64),

    #[error("unterminated REPEAT block: missing closing brace")]
    UnterminatedRepeatBlock,

    #[error("unexpected closing brace with no open REPEAT block")]
    UnmatchedClosingBrace,

    #[error("rec[-k] and sweep[k] require k >= 1, got {0}")]
    NonPositiveRecordIndex(i64),

    #[error("measurement-record lookback {lookback} exceeds the circuit's {recorded} recorded measurements at this point")]
    RecordIndexOutOfBounds { lookback: u64, recorded: u64 },
}
