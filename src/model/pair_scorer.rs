//! # Pairwise Variant Scoring
//!
//! Stores one chromosome's allele dose records and scores pairs within
//! the distance window. Replaces `sprime/SPairScorer.java`.

use crate::data::dose::DoseRec;
use crate::error::{Result, SprimeError};

/// Minimum bp gap between consecutive records in a segment
pub const MIN_DIST: u32 = 10;
/// Maximum bp gap between consecutive records in a segment
pub const MAX_DIST: u32 = 20_000;

/// Position-sorted dose records with a per-record window of prior
/// neighbors in `[pos - MAX_DIST, pos - MIN_DIST]`, both ends inclusive.
pub struct PairScorer {
    recs: Vec<DoseRec>,
    start: Vec<i32>,
    incl_end: Vec<i32>,
}

impl PairScorer {
    /// Build the neighbor table for one chromosome's dose records.
    ///
    /// Records are sorted by (marker, allele) if position order is
    /// violated. Errors if the records span more than one chromosome.
    pub fn new(mut recs: Vec<DoseRec>) -> Result<Self> {
        let mut is_sorted = true;
        for w in recs.windows(2) {
            if w[0].marker().chrom != w[1].marker().chrom {
                return Err(SprimeError::invalid_data(
                    "dose records span more than one chromosome",
                ));
            }
            if w[0].pos() > w[1].pos() {
                is_sorted = false;
            }
        }
        if !is_sorted {
            recs.sort_by(|a, b| {
                a.marker()
                    .cmp(b.marker())
                    .then_with(|| a.allele().cmp(&b.allele()))
            });
        }
        let n = recs.len();
        let mut start = vec![-1i32; n];
        let mut incl_end = vec![-1i32; n];
        for i in 0..n {
            let pos = recs[i].pos();
            let max_pos = pos as i64 - MIN_DIST as i64;
            let min_pos = pos as i64 - MAX_DIST as i64;
            let mut j = i;
            while j > 0 && (recs[j - 1].pos() as i64) > max_pos {
                j -= 1;
            }
            if j == 0 || (recs[j - 1].pos() as i64) < min_pos {
                continue;
            }
            j -= 1;
            incl_end[i] = j as i32;
            while j > 0 && (recs[j - 1].pos() as i64) >= min_pos {
                j -= 1;
            }
            start[i] = j as i32;
        }
        Ok(Self {
            recs,
            start,
            incl_end,
        })
    }

    /// Number of records
    pub fn n_recs(&self) -> usize {
        self.recs.len()
    }

    /// The record at an index
    pub fn rec(&self, index: usize) -> &DoseRec {
        &self.recs[index]
    }

    /// Smallest prior index whose position lies in the window of
    /// `index`, or -1 if none
    pub fn start(&self, index: usize) -> i32 {
        self.start[index]
    }

    /// Largest prior index whose position lies in the window of
    /// `index`, or -1 if none
    pub fn incl_end(&self, index: usize) -> i32 {
        self.incl_end[index]
    }

    /// The pair score for records `i1 < i2` given the local mutation
    /// rate per cM per meiosis.
    ///
    /// Returns negative infinity when `i1` is outside the window of
    /// `i2` or when no target sample carries both alleles; finite
    /// otherwise.
    pub fn score(&self, i1: usize, i2: usize, mut_per_cm: f64) -> f64 {
        debug_assert!(i1 < i2);
        debug_assert!(i2 < self.recs.len());
        debug_assert!(mut_per_cm.is_finite() && mut_per_cm > 0.0);
        if (i1 as i32) < self.start[i2] || (i1 as i32) > self.incl_end[i2] {
            return f64::NEG_INFINITY;
        }
        let r1 = &self.recs[i1];
        let r2 = &self.recs[i2];
        let max_distance = r1.targ_cnt() + r2.targ_cnt();
        let d = DoseRec::distance(r1, r2);
        if d == max_distance {
            // no target sample carries both alleles
            return f64::NEG_INFINITY;
        }
        let n = r1.targ_cnt().min(r2.targ_cnt()) as f64;
        let mut first_term =
            6000.0 * (1.0 - (-1.0 / (mut_per_cm * 100.0)).exp()) / (1.0 - (-1.0f64).exp());
        if r2.outgroup_cnt() > 0 {
            first_term *= 0.80;
        }
        first_term - 25_000.0 * d as f64 / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dose::GtRec;
    use crate::data::marker::{Allele, Marker};
    use crate::data::ChromIdx;
    use std::sync::Arc;

    /// Four samples; the last is outgroup
    const IN_OUTGROUP: [bool; 4] = [false, false, false, true];

    fn rec_at(pos: u32, calls: [i16; 8]) -> DoseRec {
        let marker = Arc::new(Marker::new(
            ChromIdx::new(0),
            pos,
            None,
            Allele::Base(0),
            vec![Allele::Base(1)],
        ));
        DoseRec::new(&GtRec::new(marker, calls.to_vec()), 1, &IN_OUTGROUP).unwrap()
    }

    /// Both target samples het, outgroup absent
    fn shared_rec(pos: u32) -> DoseRec {
        rec_at(pos, [0, 1, 0, 1, 0, 0, 0, 0])
    }

    #[test]
    fn test_min_dist_boundary() {
        // gap 9 < MIN_DIST: not neighbors; gap 10: neighbors
        let scorer = PairScorer::new(vec![shared_rec(100), shared_rec(109)]).unwrap();
        assert_eq!(scorer.start(1), -1);
        assert_eq!(scorer.incl_end(1), -1);

        let scorer = PairScorer::new(vec![shared_rec(100), shared_rec(110)]).unwrap();
        assert_eq!(scorer.start(1), 0);
        assert_eq!(scorer.incl_end(1), 0);
    }

    #[test]
    fn test_max_dist_boundary() {
        // gap MAX_DIST: neighbors; gap MAX_DIST + 1: not
        let scorer = PairScorer::new(vec![shared_rec(100), shared_rec(100 + MAX_DIST)]).unwrap();
        assert_eq!(scorer.start(1), 0);

        let scorer =
            PairScorer::new(vec![shared_rec(100), shared_rec(100 + MAX_DIST + 1)]).unwrap();
        assert_eq!(scorer.start(1), -1);
    }

    #[test]
    fn test_neighbor_table_monotone() {
        let recs: Vec<DoseRec> = (0..50).map(|j| shared_rec(100 + j * 500)).collect();
        let scorer = PairScorer::new(recs).unwrap();
        for i in 1..scorer.n_recs() {
            if scorer.start(i) != -1 {
                assert!(scorer.start(i) <= scorer.incl_end(i));
                let pos = scorer.rec(i).pos() as i64;
                assert!(scorer.rec(scorer.start(i) as usize).pos() as i64 >= pos - MAX_DIST as i64);
                assert!(
                    scorer.rec(scorer.incl_end(i) as usize).pos() as i64 <= pos - MIN_DIST as i64
                );
            }
            assert!(scorer.start(i) >= scorer.start(i - 1));
            assert!(scorer.incl_end(i) >= scorer.incl_end(i - 1));
        }
    }

    #[test]
    fn test_construction_is_deterministic() {
        let recs: Vec<DoseRec> = (0..20).map(|j| shared_rec(100 + j * 700)).collect();
        let a = PairScorer::new(recs.clone()).unwrap();
        let b = PairScorer::new(recs).unwrap();
        for i in 0..a.n_recs() {
            assert_eq!(a.start(i), b.start(i));
            assert_eq!(a.incl_end(i), b.incl_end(i));
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let scorer = PairScorer::new(vec![shared_rec(200), shared_rec(100)]).unwrap();
        assert_eq!(scorer.rec(0).pos(), 100);
        assert_eq!(scorer.rec(1).pos(), 200);
        assert_eq!(scorer.incl_end(1), 0);
    }

    #[test]
    fn test_mixed_chromosomes_rejected() {
        let a = shared_rec(100);
        let marker = Arc::new(Marker::new(
            ChromIdx::new(1),
            200,
            None,
            Allele::Base(0),
            vec![Allele::Base(1)],
        ));
        let b = DoseRec::new(
            &GtRec::new(marker, vec![0, 1, 0, 1, 0, 0, 0, 0]),
            1,
            &IN_OUTGROUP,
        )
        .unwrap();
        assert!(PairScorer::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_score_identical_carriers() {
        let scorer = PairScorer::new(vec![shared_rec(100), shared_rec(120)]).unwrap();
        let score = scorer.score(0, 1, 0.1);
        let expected = 6000.0 * (1.0 - (-0.1f64).exp()) / (1.0 - (-1.0f64).exp());
        assert!((score - expected).abs() < 1e-9);
        assert!((score - 903.27).abs() < 0.01);
    }

    #[test]
    fn test_score_outgroup_penalty() {
        // second record's allele appears once in the outgroup
        let a = shared_rec(100);
        let b = rec_at(120, [0, 1, 0, 1, 0, 0, 0, 1]);
        let scorer = PairScorer::new(vec![a, b]).unwrap();
        let score = scorer.score(0, 1, 0.1);
        let expected = 0.80 * 6000.0 * (1.0 - (-0.1f64).exp()) / (1.0 - (-1.0f64).exp());
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_outside_window_is_neg_infinity() {
        let scorer = PairScorer::new(vec![shared_rec(100), shared_rec(105)]).unwrap();
        assert_eq!(scorer.score(0, 1, 0.1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_score_disjoint_carriers_is_neg_infinity() {
        // first target carries a, second target carries b: d == maxD
        let a = rec_at(100, [0, 1, 0, 0, 0, 0, 0, 0]);
        let b = rec_at(120, [0, 0, 0, 1, 0, 0, 0, 0]);
        let scorer = PairScorer::new(vec![a, b]).unwrap();
        assert_eq!(scorer.score(0, 1, 0.1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_score_distance_penalty() {
        // a: both targets het; b: only the first target het
        let a = shared_rec(100);
        let b = rec_at(120, [0, 1, 0, 0, 0, 0, 0, 0]);
        let scorer = PairScorer::new(vec![a, b]).unwrap();
        // d = 1, n = min(2, 1) = 1
        let first_term = 6000.0 * (1.0 - (-0.1f64).exp()) / (1.0 - (-1.0f64).exp());
        let expected = first_term - 25_000.0;
        let score = scorer.score(0, 1, 0.1);
        assert!((score - expected).abs() < 1e-9);
        assert!(score.is_finite());
    }
}
