//! # Variant Density and Mutation Rate Estimation
//!
//! Region-adaptive estimates of variant density and cM-per-bp that feed
//! the pair scorer. Replaces `sprime/SVariants.java`.

use crate::data::genetic_map::GeneticMaps;
use crate::data::ChromIdx;
use crate::error::{Result, SprimeError};

/// Interval expansion step in bp
const STEP: u32 = 5_000;
/// Maximum expansion iterations
const MAX_ITS: u32 = 20;
/// Minimum variants for a density estimate
const MIN_NVAR: usize = 6;
/// Variant count at which expansion stops
const MAX_NVAR: usize = 10;
/// Genetic length at which cM-per-bp expansion stops
const MAX_CM: f64 = 0.01;

/// Per-chromosome variant position tables with density estimates.
///
/// Positions are stored once per ALT allele per record, so a site with
/// two ALT alleles contributes two entries at the same position.
#[derive(Clone, Debug)]
pub struct VariantDensity {
    maps: GeneticMaps,
    pos: Vec<Vec<u32>>,
    mu: f64,
    global_density: f64,
}

impl VariantDensity {
    /// Create from per-chromosome position tables (indexed by
    /// `ChromIdx`), genetic maps, and the genome-wide mutation rate per
    /// bp per meiosis.
    ///
    /// The global density is the total stored position count divided by
    /// the summed first-to-last spans of chromosomes with at least one
    /// stored position; errors if every table is empty.
    pub fn new(maps: GeneticMaps, mut pos: Vec<Vec<u32>>, mu: f64) -> Result<Self> {
        for p in &mut pos {
            p.sort_unstable();
        }
        let global_density = Self::compute_global_density(&pos)?;
        Ok(Self {
            maps,
            pos,
            mu,
            global_density,
        })
    }

    fn compute_global_density(pos: &[Vec<u32>]) -> Result<f64> {
        let mut bp = 0u64;
        let mut n_var = 0u64;
        for p in pos.iter().filter(|p| !p.is_empty()) {
            n_var += p.len() as u64;
            bp += (p[p.len() - 1] - p[0]) as u64 + 1;
        }
        if n_var == 0 {
            return Err(SprimeError::estimator(
                "no variant positions stored; cannot estimate global density",
            ));
        }
        Ok(n_var as f64 / bp as f64)
    }

    /// Number of chromosomes with at least one stored position
    pub fn n_chrom(&self) -> usize {
        self.pos.iter().filter(|p| !p.is_empty()).count()
    }

    /// The genome-wide variant density (stored positions per bp)
    pub fn global_density(&self) -> f64 {
        self.global_density
    }

    /// Estimated mutation rate per cM per meiosis for a closed
    /// chromosome interval:
    /// `(localDensity / globalDensity) * mu / cmPerBp`.
    pub fn mut_per_cm_per_gen(
        &self,
        chrom: ChromIdx,
        start_pos: u32,
        incl_end_pos: u32,
    ) -> Result<f64> {
        if incl_end_pos < start_pos {
            return Err(SprimeError::invalid_data(format!(
                "interval end {incl_end_pos} precedes start {start_pos}"
            )));
        }
        if self.chrom_pos(chrom).is_empty() {
            return Err(SprimeError::estimator(format!(
                "no variant positions stored for chromosome index {}",
                chrom.0
            )));
        }
        let cm_per_bp = self.cm_per_bp(chrom, start_pos, incl_end_pos)?;
        let local_density = self.local_density(chrom, start_pos, incl_end_pos)?;
        Ok((local_density / self.global_density) * self.mu / cm_per_bp)
    }

    fn chrom_pos(&self, chrom: ChromIdx) -> &[u32] {
        self.pos
            .get(chrom.as_usize())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Minimum cM-per-bp over the expansion schedule.
    ///
    /// Expands the interval by `STEP` bp per side, clipping to the
    /// chromosome's first and last stored position; records an estimate
    /// whenever the interval's genetic length is positive and stops
    /// once it reaches `MAX_CM`. Expansion past `MAX_ITS` iterations
    /// continues only while the genetic length is still zero; once the
    /// interval covers the whole chromosome with zero genetic length,
    /// no estimate can exist and the error is reported.
    fn cm_per_bp(&self, chrom: ChromIdx, start_pos: u32, incl_end_pos: u32) -> Result<f64> {
        let pos = self.chrom_pos(chrom);
        let first = pos[0];
        let last = pos[pos.len() - 1];
        let mut min_cm_per_bp = f64::INFINITY;
        let mut n = 0u32;
        loop {
            let expand = n.saturating_mul(STEP);
            let p1 = first.max(start_pos.saturating_sub(expand));
            let p2 = last.min(incl_end_pos.saturating_add(expand));
            let cm = self.maps.gen_pos(chrom, p2)? - self.maps.gen_pos(chrom, p1)?;
            if cm > 0.0 {
                let est = cm / (p2 - p1 + 1) as f64;
                if est < min_cm_per_bp {
                    min_cm_per_bp = est;
                }
            }
            if cm >= MAX_CM && min_cm_per_bp.is_finite() {
                break;
            }
            if n >= MAX_ITS && cm > 0.0 {
                break;
            }
            if p1 <= first && p2 >= last {
                break;
            }
            n += 1;
        }
        if !min_cm_per_bp.is_finite() {
            return Err(SprimeError::estimator("local cM per bp estimated to be 0.0"));
        }
        Ok(min_cm_per_bp)
    }

    /// Maximum local density over the expansion schedule.
    ///
    /// Records an estimate once the interval holds at least `MIN_NVAR`
    /// variants and stops once it holds `MAX_NVAR`.
    fn local_density(&self, chrom: ChromIdx, start_pos: u32, incl_end_pos: u32) -> Result<f64> {
        let pos = self.chrom_pos(chrom);
        let first = pos[0];
        let last = pos[pos.len() - 1];
        let mut max_density = f64::NEG_INFINITY;
        for n in 0..=MAX_ITS {
            let p1 = first.max(start_pos.saturating_sub(n * STEP));
            let p2 = last.min(incl_end_pos.saturating_add(n * STEP));
            let n_var = self.n_variants(chrom, p1, p2);
            if n_var >= MIN_NVAR {
                let density = n_var as f64 / (p2 - p1 + 1) as f64;
                if density >= max_density {
                    max_density = density;
                }
            }
            if n_var >= MAX_NVAR {
                break;
            }
        }
        if max_density == f64::NEG_INFINITY {
            return Err(SprimeError::estimator(
                "too few variants to estimate local variant density",
            ));
        }
        Ok(max_density)
    }

    /// Number of stored positions in the closed interval
    /// `[start_pos, incl_end_pos]`, boundary duplicates included.
    pub fn n_variants(&self, chrom: ChromIdx, start_pos: u32, incl_end_pos: u32) -> usize {
        let pos = self.chrom_pos(chrom);
        let i1 = pos.partition_point(|&p| p < start_pos);
        let i2 = pos.partition_point(|&p| p <= incl_end_pos);
        i2 - i1
    }
}
