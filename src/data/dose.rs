//! # Allele Dose Records
//!
//! Per-variant carrier sets for one candidate allele. Replaces
//! `sprime/DoseRec.java` and `vcf/GTRec.java`.

use std::sync::Arc;

use crate::data::marker::Marker;
use crate::error::{Result, SprimeError};
use crate::utils::int_set::IntSet;

/// Sentinel for a missing allele call
pub const MISSING_ALLELE: i16 = -1;

/// One parsed variant record: a marker plus two allele calls per sample.
///
/// Allele calls are indices into the marker's allele list, or
/// [`MISSING_ALLELE`]. Sample `s` owns the calls at `2s` and `2s + 1`.
#[derive(Clone, Debug)]
pub struct GtRec {
    marker: Arc<Marker>,
    alleles: Vec<i16>,
}

impl GtRec {
    /// Create a new record; `alleles` holds two calls per sample
    pub fn new(marker: Arc<Marker>, alleles: Vec<i16>) -> Self {
        debug_assert!(alleles.len() % 2 == 0);
        Self { marker, alleles }
    }

    /// The marker
    pub fn marker(&self) -> &Arc<Marker> {
        &self.marker
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.alleles.len() / 2
    }

    /// First allele call of a sample
    pub fn allele1(&self, sample: usize) -> i16 {
        self.alleles[2 * sample]
    }

    /// Second allele call of a sample
    pub fn allele2(&self, sample: usize) -> i16 {
        self.alleles[2 * sample + 1]
    }

    /// Check whether any allele call is missing
    pub fn has_missing_allele(&self) -> bool {
        self.alleles.iter().any(|&a| a == MISSING_ALLELE)
    }
}

/// Copies of `allele` among a sample's two calls
fn dose(a1: i16, a2: i16, allele: i16) -> u32 {
    (a1 == allele) as u32 + (a2 == allele) as u32
}

/// An allele dose record: the target samples carrying one candidate
/// allele of one variant, plus the allele's outgroup frequency.
#[derive(Clone, Debug)]
pub struct DoseRec {
    marker: Arc<Marker>,
    allele: usize,
    hets: IntSet,
    homs: IntSet,
    targ_cnt: u32,
    outgroup_cnt: u32,
    outgroup_freq: f32,
}

impl DoseRec {
    /// Build the dose record for one candidate allele of one record.
    ///
    /// `in_outgroup[s]` marks outgroup samples; all other samples are
    /// targets. Missing allele calls never count toward the candidate
    /// allele, and missing outgroup calls shrink the frequency
    /// denominator.
    pub fn new(rec: &GtRec, allele: usize, in_outgroup: &[bool]) -> Result<Self> {
        if allele >= rec.marker().n_alleles() {
            return Err(SprimeError::invalid_data(format!(
                "allele index {} out of range for marker with {} alleles",
                allele,
                rec.marker().n_alleles()
            )));
        }
        if in_outgroup.len() != rec.n_samples() {
            return Err(SprimeError::invalid_data(format!(
                "outgroup flags for {} samples but record has {}",
                in_outgroup.len(),
                rec.n_samples()
            )));
        }
        let mut hets = IntSet::with_capacity(10);
        let mut homs = IntSet::with_capacity(4);
        let mut outgroup_cnt = 0u32;
        let mut outgroup_non_missing = 0u32;
        for (s, &is_outgroup) in in_outgroup.iter().enumerate() {
            let a1 = rec.allele1(s);
            let a2 = rec.allele2(s);
            let d = dose(a1, a2, allele as i16);
            if is_outgroup {
                outgroup_cnt += d;
                outgroup_non_missing += 2 - dose(a1, a2, MISSING_ALLELE);
            } else {
                match d {
                    0 => {}
                    1 => {
                        hets.add(s as u32);
                    }
                    2 => {
                        homs.add(s as u32);
                    }
                    _ => unreachable!(),
                }
            }
        }
        let targ_cnt = hets.len() as u32 + 2 * homs.len() as u32;
        let outgroup_freq = if outgroup_non_missing == 0 {
            0.0
        } else {
            outgroup_cnt as f32 / outgroup_non_missing as f32
        };
        Ok(Self {
            marker: rec.marker().clone(),
            allele,
            hets,
            homs,
            targ_cnt,
            outgroup_cnt,
            outgroup_freq,
        })
    }

    /// Sum over all target samples of the absolute allele dose
    /// difference between two records.
    ///
    /// Computed from the carrier sets without materializing a dose
    /// vector; symmetric and bounded by `a.targ_cnt() + b.targ_cnt()`.
    pub fn distance(a: &DoseRec, b: &DoseRec) -> u32 {
        let mut cnt = 0;
        for sample in a.hets.iter() {
            if !b.hets.contains(sample) {
                cnt += 1;
            }
        }
        for sample in a.homs.iter() {
            if b.hets.contains(sample) {
                cnt += 1;
            } else if !b.homs.contains(sample) {
                cnt += 2;
            }
        }
        for sample in b.hets.iter() {
            if !a.hets.contains(sample) && !a.homs.contains(sample) {
                cnt += 1;
            }
        }
        for sample in b.homs.iter() {
            if !a.hets.contains(sample) && !a.homs.contains(sample) {
                cnt += 2;
            }
        }
        cnt
    }

    /// The chromosome position
    pub fn pos(&self) -> u32 {
        self.marker.pos
    }

    /// The marker
    pub fn marker(&self) -> &Arc<Marker> {
        &self.marker
    }

    /// The candidate allele index
    pub fn allele(&self) -> usize {
        self.allele
    }

    /// Target samples carrying exactly one copy
    pub fn hets(&self) -> &IntSet {
        &self.hets
    }

    /// Target samples carrying two copies
    pub fn homs(&self) -> &IntSet {
        &self.homs
    }

    /// Copies of the candidate allele among target samples
    pub fn targ_cnt(&self) -> u32 {
        self.targ_cnt
    }

    /// Copies of the candidate allele among outgroup samples
    pub fn outgroup_cnt(&self) -> u32 {
        self.outgroup_cnt
    }

    /// Frequency of the candidate allele among non-missing outgroup
    /// allele calls (0 when the outgroup has no non-missing calls)
    pub fn outgroup_freq(&self) -> f32 {
        self.outgroup_freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::marker::Allele;
    use crate::data::ChromIdx;

    fn marker(pos: u32) -> Arc<Marker> {
        Arc::new(Marker::new(
            ChromIdx::new(0),
            pos,
            None,
            Allele::Base(0),
            vec![Allele::Base(1)],
        ))
    }

    /// Samples: [target het, target hom, target ref, outgroup carrier]
    fn rec(pos: u32) -> GtRec {
        GtRec::new(marker(pos), vec![0, 1, 1, 1, 0, 0, 0, 1])
    }

    const IN_OUTGROUP: [bool; 4] = [false, false, false, true];

    #[test]
    fn test_carrier_sets() {
        let r = DoseRec::new(&rec(100), 1, &IN_OUTGROUP).unwrap();
        assert_eq!(r.hets().as_slice(), &[0]);
        assert_eq!(r.homs().as_slice(), &[1]);
        assert_eq!(r.targ_cnt(), 3);
        assert_eq!(r.outgroup_cnt(), 1);
        assert!((r.outgroup_freq() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hets_homs_disjoint() {
        let r = DoseRec::new(&rec(100), 1, &IN_OUTGROUP).unwrap();
        for s in r.hets().iter() {
            assert!(!r.homs().contains(s));
        }
    }

    #[test]
    fn test_missing_alleles_do_not_count() {
        let m = marker(100);
        let r = GtRec::new(m, vec![MISSING_ALLELE, 1, 0, 0, 0, 0, MISSING_ALLELE, MISSING_ALLELE]);
        let d = DoseRec::new(&r, 1, &IN_OUTGROUP).unwrap();
        assert_eq!(d.hets().as_slice(), &[0]);
        assert_eq!(d.targ_cnt(), 1);
        assert_eq!(d.outgroup_cnt(), 0);
        // both outgroup calls missing: frequency denominator guarded
        assert_eq!(d.outgroup_freq(), 0.0);
    }

    #[test]
    fn test_ref_allele_dose() {
        let r = DoseRec::new(&rec(100), 0, &IN_OUTGROUP).unwrap();
        assert_eq!(r.hets().as_slice(), &[0]);
        assert_eq!(r.homs().as_slice(), &[2]);
        assert_eq!(r.outgroup_cnt(), 1);
    }

    #[test]
    fn test_invalid_allele_index() {
        assert!(DoseRec::new(&rec(100), 2, &IN_OUTGROUP).is_err());
    }

    #[test]
    fn test_outgroup_length_mismatch() {
        assert!(DoseRec::new(&rec(100), 1, &[false; 3]).is_err());
    }

    #[test]
    fn test_distance_identity_and_symmetry() {
        let a = DoseRec::new(&rec(100), 1, &IN_OUTGROUP).unwrap();
        let b = DoseRec::new(
            &GtRec::new(marker(200), vec![0, 0, 1, 1, 0, 1, 0, 0]),
            1,
            &IN_OUTGROUP,
        )
        .unwrap();
        assert_eq!(DoseRec::distance(&a, &a), 0);
        assert_eq!(DoseRec::distance(&a, &b), DoseRec::distance(&b, &a));
        assert!(DoseRec::distance(&a, &b) <= a.targ_cnt() + b.targ_cnt());
    }

    #[test]
    fn test_distance_value() {
        // a: s0 het, s1 hom, s2 ref; b: s0 ref, s1 hom, s2 het
        let a = DoseRec::new(&rec(100), 1, &IN_OUTGROUP).unwrap();
        let b = DoseRec::new(
            &GtRec::new(marker(200), vec![0, 0, 1, 1, 0, 1, 0, 0]),
            1,
            &IN_OUTGROUP,
        )
        .unwrap();
        // |1-0| + |2-2| + |0-1| = 2
        assert_eq!(DoseRec::distance(&a, &b), 2);
    }

    #[test]
    fn test_distance_disjoint_carriers_hits_bound() {
        let a = DoseRec::new(&GtRec::new(marker(100), vec![0, 1, 0, 0, 0, 0, 0, 0]), 1, &IN_OUTGROUP)
            .unwrap();
        let b = DoseRec::new(&GtRec::new(marker(200), vec![0, 0, 1, 1, 0, 0, 0, 0]), 1, &IN_OUTGROUP)
            .unwrap();
        assert_eq!(DoseRec::distance(&a, &b), a.targ_cnt() + b.targ_cnt());
    }
}
