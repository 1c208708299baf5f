//! # Segment Extraction
//!
//! Repeated longest-path dynamic program over one chromosome's dose
//! records, with incremental rescoring after each extracted segment.
//! Replaces the analysis loop of `sprime/SAnalyzer.java`.
//!
//! A segment is a strictly position-increasing chain of records with
//! consecutive gaps in `[MIN_DIST, MAX_DIST]`. Edges are weighted by
//! the pair score; excluded records carry a score of negative infinity,
//! which the `score >= 0` predicate keeps out of later chains.

use bitvec::vec::BitVec;

use crate::io::output::OutRec;
use crate::model::density::VariantDensity;
use crate::model::pair_scorer::{PairScorer, MAX_DIST};
use crate::error::Result;

/// Longest-path DP state over one chromosome's dose records
pub struct SegmentFinder<'a> {
    scorer: &'a PairScorer,
    density: &'a VariantDensity,
    min_score: f64,
    scores: Vec<f64>,
    prev: Vec<i32>,
    changed: BitVec,
}

impl<'a> SegmentFinder<'a> {
    /// Create the finder and run the initial DP fill
    pub fn new(
        scorer: &'a PairScorer,
        density: &'a VariantDensity,
        min_score: f64,
    ) -> Result<Self> {
        let n = scorer.n_recs();
        let mut finder = Self {
            scorer,
            density,
            min_score,
            scores: vec![0.0; n],
            prev: vec![-1; n],
            changed: BitVec::repeat(false, n),
        };
        for i in 0..n {
            finder.set_score(i)?;
        }
        Ok(finder)
    }

    /// Best chain score ending at each record (test support)
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Predecessor of each record on its best chain, -1 if none
    pub fn prev(&self) -> &[i32] {
        &self.prev
    }

    /// Extract segments until the best remaining chain falls below the
    /// acceptance threshold. Emitted rows share their segment's index
    /// and score; `segment_cnt` numbers segments across chromosomes.
    pub fn run(&mut self, segment_cnt: &mut u32, out: &mut Vec<OutRec>) -> Result<()> {
        if self.scorer.n_recs() == 0 {
            return Ok(());
        }
        let mut indices = self.store_max_seg(segment_cnt, out);
        while !indices.is_empty() {
            self.exclude(&indices);
            let mut last_changed_pos = self.scorer.rec(indices[indices.len() - 1]).pos() as i64;
            let mut finished = false;
            let mut i = indices[0] + 1;
            while i < self.scorer.n_recs() && !finished {
                if self.needs_rescore(i) {
                    self.set_score(i)?;
                    self.changed.set(i, true);
                    let pos = self.scorer.rec(i).pos() as i64;
                    if pos > last_changed_pos {
                        last_changed_pos = pos;
                    }
                }
                finished = self.scorer.rec(i).pos() as i64 - last_changed_pos > MAX_DIST as i64;
                i += 1;
            }
            indices = self.store_max_seg(segment_cnt, out);
        }
        Ok(())
    }

    /// Recompute the best chain ending at one record from its window
    fn set_score(&mut self, index: usize) -> Result<()> {
        let start = self.scorer.start(index);
        let incl_end = self.scorer.incl_end(index);
        self.scores[index] = 0.0;
        self.prev[index] = -1;
        if start == -1 {
            return Ok(());
        }
        let chrom = self.scorer.rec(index).marker().chrom;
        let p2 = self.scorer.rec(index).pos();
        for k in start as usize..=incl_end as usize {
            if self.scores[k] >= 0.0 {
                let p1 = self.scorer.rec(k).pos();
                let mut_per_cm = self.density.mut_per_cm_per_gen(chrom, p1, p2)?;
                let score = self.scores[k] + self.scorer.score(k, index, mut_per_cm);
                if score > self.scores[index] {
                    self.scores[index] = score;
                    self.prev[index] = k as i32;
                }
            }
        }
        Ok(())
    }

    /// Whether the record's cached chain runs through a changed
    /// predecessor and must be recomputed
    fn needs_rescore(&self, index: usize) -> bool {
        let prev = self.prev[index];
        self.scores[index] >= 0.0 && prev != -1 && self.changed[prev as usize]
    }

    /// Emit the best chain if it meets the threshold; returns the
    /// extracted indices in ascending order (empty at termination)
    fn store_max_seg(&mut self, segment_cnt: &mut u32, out: &mut Vec<OutRec>) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut index = self.max_index();
        let score = self.scores[index];
        if score >= self.min_score {
            self.push_out_rec(index, *segment_cnt, score, out);
            indices.push(index);
            while self.prev[index] != -1 {
                index = self.prev[index] as usize;
                self.push_out_rec(index, *segment_cnt, score, out);
                indices.push(index);
            }
            *segment_cnt += 1;
        }
        indices.sort_unstable();
        indices
    }

    fn push_out_rec(&self, index: usize, segment: u32, score: f64, out: &mut Vec<OutRec>) {
        let rec = self.scorer.rec(index);
        out.push(OutRec {
            marker: rec.marker().clone(),
            allele: rec.allele(),
            segment,
            score,
        });
    }

    /// Remove the extracted records from every future chain
    fn exclude(&mut self, indices: &[usize]) {
        self.changed.fill(false);
        for &i in indices {
            self.scores[i] = f64::NEG_INFINITY;
            self.prev[i] = -1;
            self.changed.set(i, true);
        }
    }

    /// Index of the maximum score; ties resolve to the highest index so
    /// the termination guard stays well-defined when all remaining
    /// scores are equal
    fn max_index(&self) -> usize {
        let mut max = f64::NEG_INFINITY;
        let mut max_index = 0;
        for (j, &score) in self.scores.iter().enumerate() {
            if score >= max {
                max = score;
                max_index = j;
            }
        }
        max_index
    }
}
