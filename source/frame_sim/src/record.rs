use bitpack::{BitTable, BitVector, BitVectorView};

use crate::error::SimulationError;

/// Receives finished measurement rows as a [`FrameSimulator`](crate::FrameSimulator)
/// run streams past the configured window. Rows are measurement-major: `rows.row(i)` is the
/// per-shot outcome bits of absolute measurement id `absolute_start + i`.
pub trait MeasurementSink {
    fn accept_rows(&mut self, absolute_start: u64, rows: &BitTable, row_count: usize) -> Result<(), SimulationError>;
}

/// A sink that appends every flushed row into one growing in-memory
/// table; the common case when the caller never asked for streaming.
#[derive(Default)]
pub struct VecSink {
    rows: Vec<BitVector>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<BitVector> {
        self.rows
    }
}

impl MeasurementSink for VecSink {
    fn accept_rows(&mut self, _absolute_start: u64, rows: &BitTable, row_count: usize) -> Result<(), SimulationError> {
        for i in 0..row_count {
            self.rows.push(rows.row(i).to_owned());
        }
        Ok(())
    }
}

/// A sink that discards everything, for callers who only care about
/// detectors/observables.
pub struct NullSink;

impl MeasurementSink for NullSink {
    fn accept_rows(&mut self, _absolute_start: u64, _rows: &BitTable, _row_count: usize) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// Append-only, random-access-by-negative-offset log of measurement
/// outcomes. Storage is measurement-major (`row(i)` is one measurement event's outcome
/// across every shot) because that is the orientation the frame
/// simulator naturally produces one row at a time; shot-major views
/// are obtained on demand via [`BitTable::transposed`] when exporting.
///
/// A fixed-capacity window of rows is kept resident; when it fills, the
/// resident rows are flushed through a [`MeasurementSink`] and the
/// window's logical base id advances, bounding peak memory for
/// arbitrarily long runs.
pub struct MeasurementRecord {
    window: BitTable,
    batch_size: usize,
    capacity: usize,
    len: usize,
    base: u64,
    total: u64,
}

impl MeasurementRecord {
    #[must_use]
    pub fn new(capacity: usize, batch_size: usize) -> Self {
        Self {
            window: BitTable::zeros(capacity.max(1), batch_size),
            batch_size,
            capacity: capacity.max(1),
            len: 0,
            base: 0,
            total: 0,
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn total_recorded(&self) -> u64 {
        self.total
    }

    /// Records one measurement event's outcome across all shots,
    /// returning its absolute id. Flushes the window through `sink`
    /// first if it is already full.
    pub fn push_row(&mut self, bits: &BitVector, sink: &mut dyn MeasurementSink) -> Result<u64, SimulationError> {
        if self.len == self.capacity {
            self.flush(sink)?;
        }
        self.window.row_mut(self.len).clear();
        self.window.row_mut(self.len).xor_assign(&bits.as_view());
        let id = self.total;
        self.len += 1;
        self.total += 1;
        Ok(id)
    }

    /// Flushes every resident row through `sink` and advances the
    /// window's base, without changing `total`.
    pub fn flush(&mut self, sink: &mut dyn MeasurementSink) -> Result<(), SimulationError> {
        if self.len == 0 {
            return Ok(());
        }
        log::debug!("flushing {} measurement rows starting at absolute id {}", self.len, self.base);
        sink.accept_rows(self.base, &self.window, self.len)?;
        self.base += self.len as u64;
        self.len = 0;
        for i in 0..self.capacity {
            self.window.row_mut(i).clear();
        }
        Ok(())
    }

    /// Looks up `rec[-lookback]` relative to the number of measurements
    /// recorded so far.
    pub fn lookback(&self, lookback: u64) -> Result<BitVectorView<'_>, SimulationError> {
        if lookback == 0 || lookback > self.total {
            return Err(SimulationError::RecordIndexOutOfBounds { lookback, recorded: self.total });
        }
        let absolute = self.total - lookback;
        self.absolute(absolute)
    }

    /// Looks up a measurement by its absolute (not relative) id.
    pub fn absolute(&self, id: u64) -> Result<BitVectorView<'_>, SimulationError> {
        if id < self.base {
            return Err(SimulationError::RecordIndexFlushed { lookback: self.total - id, window_start: self.base });
        }
        let row = (id - self.base) as usize;
        if row >= self.len {
            return Err(SimulationError::RecordIndexOutOfBounds { lookback: self.total - id, recorded: self.total });
        }
        Ok(self.window.row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_lookback_round_trip() {
        let mut record = MeasurementRecord::new(8, 4);
        let mut sink = NullSink;
        let mut row = BitVector::zeros(4);
        row.set(1, true);
        record.push_row(&row, &mut sink).unwrap();
        let back = record.lookback(1).unwrap();
        assert!(back.get(1));
        assert!(!back.get(0));
    }

    #[test]
    fn zero_lookback_is_rejected() {
        let record = MeasurementRecord::new(4, 2);
        assert!(record.lookback(0).is_err());
    }

    #[test]
    fn streaming_flush_advances_window_and_preserves_order() {
        let mut record = MeasurementRecord::new(2, 2);
        let mut sink = VecSink::new();
        for i in 0..5u8 {
            let mut row = BitVector::zeros(2);
            row.set(0, i % 2 == 0);
            record.push_row(&row, &mut sink).unwrap();
        }
        record.flush(&mut sink).unwrap();
        let rows = sink.into_rows();
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.get(0), i % 2 == 0);
        }
    }

    #[test]
    fn lookback_past_flushed_window_is_an_error() {
        let mut record = MeasurementRecord::new(2, 2);
        let mut sink = NullSink;
        for _ in 0..3u8 {
            record.push_row(&BitVector::zeros(2), &mut sink).unwrap();
        }
        let err = record.lookback(3).unwrap_err();
        assert!(matches!(err, SimulationError::RecordIndexFlushed { .. }));
    }
}
