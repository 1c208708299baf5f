//! # Pipelines Module (Orchestration)
//!
//! High-level workflow coordination. Connects I/O, data structures, and
//! algorithms: load data through `io`, process with `model`, write
//! output through `io`.

pub mod analysis;

pub use analysis::{Analyzer, AnalysisSummary};
