//! # Model Module
//!
//! The introgression-scoring core.
//!
//! ## Core Algorithms
//! - `density`: region-adaptive variant density and cM-per-bp estimates
//! - `pair_scorer`: distance-window neighbor table and pairwise scores
//! - `segments`: repeated longest-path DP with incremental rescoring

pub mod density;
pub mod pair_scorer;
pub mod segments;

pub use density::VariantDensity;
pub use pair_scorer::PairScorer;
pub use segments::SegmentFinder;
