use thiserror::Error;

/// Recoverable errors raised while sampling a circuit.
///
/// Mirrors `circuit::CircuitError`'s shape: one variant per error kind
/// from the core's error taxonomy, no panics on a path a caller can
/// hit with ordinary (if malformed) input.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("rec[-{lookback}] looks back past the {recorded} measurements recorded so far")]
    RecordIndexOutOfBounds { lookback: u64, recorded: u64 },

    #[error("rec[-{lookback}] refers to a measurement already flushed out of the streaming window (window starts at {window_start})")]
    RecordIndexFlushed { lookback: u64, window_start: u64 },

    #[error("target qubit {qubit} is outside the simulator's declared {num_qubits} qubits")]
    QubitOutOfRange { qubit: u32, num_qubits: usize },

    #[error("measurement sink reported a failure: {0}")]
    SinkFailed(String),

    #[error("malformed measurement sample data: {0}")]
    MalformedSampleData(String),
}
