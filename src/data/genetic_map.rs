//! # Genetic Map Interpolation
//!
//! Convert physical positions (base pairs) to genetic distances
//! (centiMorgans). Replaces `vcf/PlinkGenMap.java`.
//!
//! ## File Format (PLINK .map)
//! ```text
//! 1  rs123  0.05  10000
//! 1  rs456  0.10  20000
//! ```
//! Columns: chrom, id, cM, bp. Positions must be strictly increasing
//! within each chromosome.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::data::marker::ChromIds;
use crate::data::ChromIdx;
use crate::error::{Result, SprimeError};

/// Genetic map for a single chromosome
#[derive(Clone, Debug, Default)]
pub struct GeneticMap {
    /// Sorted (base_pair, centimorgan) pairs
    points: Vec<(u32, f64)>,
}

impl GeneticMap {
    /// Create from sorted (bp, cM) points
    pub fn new(points: Vec<(u32, f64)>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        Self { points }
    }

    /// Number of map points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Genetic position in cM at a physical position.
    ///
    /// Piecewise-linear interpolation between surrounding map points;
    /// positions beyond either end extrapolate with the nearest
    /// interval's slope. A single-point map is a constant.
    pub fn gen_pos(&self, bp: u32) -> f64 {
        match self.points.len() {
            0 => 0.0,
            1 => self.points[0].1,
            _ => {
                let i = match self.points.binary_search_by_key(&bp, |&(p, _)| p) {
                    Ok(i) => return self.points[i].1,
                    Err(i) => i,
                };
                // clamp to the first/last interval for extrapolation
                let hi = i.clamp(1, self.points.len() - 1);
                let (bp1, cm1) = self.points[hi - 1];
                let (bp2, cm2) = self.points[hi];
                let slope = (cm2 - cm1) / (bp2 - bp1) as f64;
                cm1 + (bp as f64 - bp1 as f64) * slope
            }
        }
    }

    /// Genetic distance in cM between two physical positions
    pub fn gen_dist(&self, bp1: u32, bp2: u32) -> f64 {
        (self.gen_pos(bp2) - self.gen_pos(bp1)).abs()
    }
}

/// Genetic maps for all chromosomes, indexed by `ChromIdx`
#[derive(Clone, Debug, Default)]
pub struct GeneticMaps {
    maps: Vec<Option<GeneticMap>>,
}

impl GeneticMaps {
    /// Load from a PLINK-format genetic map file.
    ///
    /// Chromosome names are interned through the shared registry so
    /// indices agree with those assigned while reading the variant
    /// table.
    pub fn from_plink_file(path: &Path, chrom_ids: &mut ChromIds) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut maps = Self::default();
        let mut points: Vec<Vec<(u32, f64)>> = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (chrom, _id, cm, bp) = match (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) {
                (Some(c), Some(i), Some(cm), Some(bp)) => (c, i, cm, bp),
                _ => {
                    return Err(SprimeError::parse(
                        line_no + 1,
                        format!("expected 4 columns in genetic map: {line}"),
                    ));
                }
            };
            let cm: f64 = cm.parse().map_err(|_| {
                SprimeError::parse(line_no + 1, format!("invalid cM value: {cm}"))
            })?;
            let bp: u32 = bp.parse().map_err(|_| {
                SprimeError::parse(line_no + 1, format!("invalid bp position: {bp}"))
            })?;
            let chrom = chrom_ids.get_or_insert(chrom);
            while points.len() <= chrom.as_usize() {
                points.push(Vec::new());
            }
            let chrom_points = &mut points[chrom.as_usize()];
            if let Some(&(last_bp, _)) = chrom_points.last() {
                if bp <= last_bp {
                    return Err(SprimeError::parse(
                        line_no + 1,
                        format!("genetic map positions not increasing at bp {bp}"),
                    ));
                }
            }
            chrom_points.push((bp, cm));
        }
        maps.maps = points
            .into_iter()
            .map(|p| if p.is_empty() { None } else { Some(GeneticMap::new(p)) })
            .collect();
        Ok(maps)
    }

    /// Insert the map for one chromosome
    pub fn insert(&mut self, chrom: ChromIdx, map: GeneticMap) {
        while self.maps.len() <= chrom.as_usize() {
            self.maps.push(None);
        }
        self.maps[chrom.as_usize()] = Some(map);
    }

    /// The map for one chromosome, if present
    pub fn get(&self, chrom: ChromIdx) -> Option<&GeneticMap> {
        self.maps.get(chrom.as_usize()).and_then(|m| m.as_ref())
    }

    /// Genetic position in cM; errors if the chromosome is unmapped
    pub fn gen_pos(&self, chrom: ChromIdx, bp: u32) -> Result<f64> {
        self.get(chrom)
            .map(|m| m.gen_pos(bp))
            .ok_or_else(|| {
                SprimeError::invalid_data(format!(
                    "no genetic map for chromosome index {}",
                    chrom.0
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> GeneticMap {
        GeneticMap::new(vec![(10_000, 0.0), (20_000, 1.0), (40_000, 2.0)])
    }

    #[test]
    fn test_interpolation_at_points() {
        let m = map();
        assert_eq!(m.gen_pos(10_000), 0.0);
        assert_eq!(m.gen_pos(20_000), 1.0);
        assert_eq!(m.gen_pos(40_000), 2.0);
    }

    #[test]
    fn test_interpolation_between_points() {
        let m = map();
        assert!((m.gen_pos(15_000) - 0.5).abs() < 1e-12);
        assert!((m.gen_pos(30_000) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolation_uses_flanking_slope() {
        let m = map();
        // below: slope 1.0 cM / 10 kb
        assert!((m.gen_pos(5_000) - (-0.5)).abs() < 1e-12);
        // above: slope 1.0 cM / 20 kb
        assert!((m.gen_pos(60_000) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_is_constant() {
        let m = GeneticMap::new(vec![(10_000, 0.7)]);
        assert_eq!(m.gen_pos(1), 0.7);
        assert_eq!(m.gen_pos(1_000_000), 0.7);
    }

    #[test]
    fn test_gen_dist_symmetric() {
        let m = map();
        assert_eq!(m.gen_dist(10_000, 20_000), m.gen_dist(20_000, 10_000));
    }
}
