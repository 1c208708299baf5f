//! # Analysis Pipeline
//!
//! Orchestrates a full run: one streaming pass to build the global
//! variant density, then one pass per chromosome through the segment
//! finder. Replaces `sprime/SAnalyzer.java`.

use tracing::{info_span, warn};

use crate::config::Config;
use crate::data::genetic_map::GeneticMaps;
use crate::data::marker::ChromIds;
use crate::error::{Result, SprimeError};
use crate::io::output::{write_score_file, OutRec, RunLog};
use crate::io::vcf::VcfReader;
use crate::io::window::ChromWindows;
use crate::model::density::VariantDensity;
use crate::model::pair_scorer::PairScorer;
use crate::model::segments::SegmentFinder;

/// Counters reported after a completed run
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalysisSummary {
    /// Chromosomes contributing to the global density
    pub n_chrom: usize,
    /// Outgroup samples identified in the variant table
    pub n_outgroup_samples: usize,
    /// Target samples
    pub n_target_samples: usize,
    /// Allele dose records analyzed
    pub n_variants: usize,
    /// Introgressed segments detected
    pub n_segments: u32,
}

/// A full introgression analysis over one variant table
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    /// Create an analyzer for the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The analysis configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the analysis and write the `.score` file
    pub fn run(&self, log: &mut RunLog) -> Result<AnalysisSummary> {
        let exclude_samples = self.config.load_exclude_samples()?;
        let exclude_markers = self.config.load_exclude_markers()?;
        let outgroup_ids = self.config.load_outgroup()?;
        let mut chrom_ids = ChromIds::new();

        // Pass 1 reads every chromosome: the global density denominator
        // must not be narrowed by the chrom parameter.
        let positions = info_span!("density_scan").in_scope(|| {
            self.scan_positions(&mut chrom_ids, &exclude_samples, &exclude_markers)
        })?;
        let maps = GeneticMaps::from_plink_file(&self.config.map, &mut chrom_ids)?;
        let density = VariantDensity::new(maps, positions, self.config.mu)?;
        if density.n_chrom() == 1 {
            log.duo("")?;
            log.duo("WARNING: The input VCF file contains only one chromosome.")?;
            log.duo("All autosomes must be included in the input VCF file in")?;
            log.duo("order to estimate a genomewide variant density.")?;
        }

        // Pass 2 applies the interval filter and finds segments.
        let mut reader = VcfReader::open(&self.config.gt)?;
        reader.set_exclude_samples(&exclude_samples);
        reader.set_exclude_markers(&exclude_markers);
        let interval = self.config.chrom_interval();
        let mut windows = ChromWindows::new(
            reader,
            &outgroup_ids,
            self.config.maxfreq,
            interval.as_ref(),
            &mut chrom_ids,
        )?;
        if !windows.has_next() {
            return Err(SprimeError::vcf(
                "no VCF records found in the specified interval",
            ));
        }
        if windows.n_outgroup_samples() == 0 {
            warn!("no outgroup samples identified in the variant table");
        }

        let mut out_recs: Vec<OutRec> = Vec::with_capacity(1000);
        let mut n_variants = 0;
        let mut segment_cnt = 0u32;
        while let Some(recs) = windows.next_window(&mut chrom_ids)? {
            n_variants += recs.len();
            let scorer = PairScorer::new(recs)?;
            let mut finder =
                SegmentFinder::new(&scorer, &density, self.config.minscore)?;
            finder.run(&mut segment_cnt, &mut out_recs)?;
        }

        write_score_file(&self.config.score_path(), &mut out_recs, &chrom_ids)?;

        Ok(AnalysisSummary {
            n_chrom: density.n_chrom(),
            n_outgroup_samples: windows.n_outgroup_samples(),
            n_target_samples: windows.n_target_samples(),
            n_variants,
            n_segments: segment_cnt,
        })
    }

    /// Stream the full variant table once, storing one position per ALT
    /// allele per record, grouped by chromosome.
    fn scan_positions(
        &self,
        chrom_ids: &mut ChromIds,
        exclude_samples: &std::collections::HashSet<String>,
        exclude_markers: &std::collections::HashSet<String>,
    ) -> Result<Vec<Vec<u32>>> {
        let mut reader = VcfReader::open(&self.config.gt)?;
        reader.set_exclude_samples(exclude_samples);
        reader.set_exclude_markers(exclude_markers);
        let mut positions: Vec<Vec<u32>> = Vec::with_capacity(30);
        while let Some(rec) = reader.next_rec(chrom_ids)? {
            let marker = rec.marker();
            let chrom = marker.chrom.as_usize();
            while positions.len() <= chrom {
                positions.push(Vec::with_capacity(1000));
            }
            for _ in 1..marker.n_alleles() {
                positions[chrom].push(marker.pos);
            }
        }
        Ok(positions)
    }
}
