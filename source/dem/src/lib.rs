//! Detector error models: symbolic analysis of a
//! [`circuit::Circuit`]'s annotations into the independent noise
//! channels that can flip them, and the text format the result is
//! exchanged in.

mod analyzer;
mod decompose;
mod error;
mod format;
mod model;
mod reverse;
mod target;
mod target_set;

pub use analyzer::{analyze, AnalyzeOptions, GaugeDetectorPolicy};
pub use decompose::GraphlikePool;
pub use error::AnalysisError;
pub use format::{parse_dem_text, write_dem_text};
pub use model::{DemInstruction, DetectorErrorModel};
pub use target::{DemTarget, DemTargetKind};
pub use target_set::DemTargetSet;
