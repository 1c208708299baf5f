//! # Data Module
//!
//! In-memory representations of genomic data.
//!
//! ## Design Philosophy
//! - **Zero-cost newtypes:** `ChromIdx`, `SampleIdx` prevent index bugs
//!   at compile time with no runtime overhead.
//! - **Shared handles:** markers are shared via `Arc<Marker>` so that a
//!   variant's dose records and output rows reference one allocation.
//!
//! ## Sub-modules
//! - `marker`: Genomic position and allele definitions
//! - `samples`: Sample identifiers and indices
//! - `genetic_map`: Physical-to-genetic distance interpolation
//! - `dose`: Per-variant allele dose records

pub mod dose;
pub mod genetic_map;
pub mod marker;
pub mod samples;

pub use dose::DoseRec;
pub use genetic_map::{GeneticMap, GeneticMaps};
pub use marker::{Allele, ChromIds, Marker};
pub use samples::{SampleIdx, Samples};

/// Zero-cost newtype for chromosome indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChromIdx(pub u16);

impl ChromIdx {
    pub fn new(idx: u16) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for ChromIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u16)
    }
}
