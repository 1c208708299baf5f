//! # I/O Module
//!
//! File reading/writing boundaries. Streams the variant table into
//! per-chromosome dose record arrays and writes the score output.

pub mod output;
pub mod vcf;
pub mod window;

pub use output::{write_score_file, OutRec, RunLog};
pub use vcf::VcfReader;
pub use window::ChromWindows;
