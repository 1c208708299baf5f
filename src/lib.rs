//! # rsprime Library
//!
//! Detection of archaic introgression from rare-variant sharing.
//! A Rust implementation of SPrime.
//!
//! ## Modules
//! - `config`: CLI argument parsing and validation
//! - `data`: In-memory representations of genomic data
//! - `error`: Error types and result aliases
//! - `io`: File reading/writing (VCF, chromosome windows, score output)
//! - `model`: Density estimation, pair scoring, segment extraction
//! - `pipelines`: High-level workflow orchestration
//! - `utils`: Shared utilities (indexed integer set)

pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod pipelines;
pub mod utils;

// Re-export commonly used types
pub use config::{ChromInterval, Config};
pub use data::{Allele, ChromIds, ChromIdx, DoseRec, GeneticMap, GeneticMaps, Marker, Samples};
pub use error::{Result, SprimeError};
pub use io::{ChromWindows, OutRec, RunLog, VcfReader};
pub use model::{PairScorer, SegmentFinder, VariantDensity};
pub use pipelines::{AnalysisSummary, Analyzer};
pub use utils::IntSet;
