//! # VCF Reading
//!
//! Streaming parser for GT-only multi-sample VCF input. The header is
//! parsed with the `noodles` crate; record bodies are tab-split by
//! hand. Replaces `vcf/VcfIt.java` and `vcf/VcfRecGTParser.java`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use noodles::vcf::Header;
use tracing::info_span;

use crate::data::dose::{GtRec, MISSING_ALLELE};
use crate::data::marker::{Allele, ChromIds, Marker};
use crate::data::samples::Samples;
use crate::error::{Result, SprimeError};

/// Streaming VCF reader yielding one [`GtRec`] per data line
pub struct VcfReader {
    reader: Box<dyn BufRead + Send>,
    /// Samples after exclusion filtering
    samples: Arc<Samples>,
    /// Number of sample columns in the header
    n_header_samples: usize,
    /// Original column indices to keep (None = keep all)
    include_sample_indices: Option<Vec<usize>>,
    /// Marker IDs to skip (None = skip none)
    exclude_marker_ids: Option<HashSet<String>>,
    /// 1-based line number for diagnostics
    line_no: usize,
}

impl VcfReader {
    /// Open a VCF file and read the header.
    ///
    /// Files ending in `.gz`/`.bgz` are decompressed with a multi-member
    /// gzip decoder, which also handles bgzf-blocked input.
    pub fn open(path: &Path) -> Result<Self> {
        info_span!("vcf_open", path = ?path).in_scope(|| {
            let file = File::open(path)?;
            let is_gzipped = path
                .extension()
                .map(|e| e == "gz" || e == "bgz")
                .unwrap_or(false);
            let reader: Box<dyn BufRead + Send> = if is_gzipped {
                Box::new(BufReader::new(MultiGzDecoder::new(file)))
            } else {
                Box::new(BufReader::new(file))
            };
            Self::from_reader(reader)
        })
    }

    /// Create from a buffered reader positioned at the first header line
    pub fn from_reader(mut reader: Box<dyn BufRead + Send>) -> Result<Self> {
        let mut header_str = String::new();
        let mut line_no = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Err(SprimeError::parse(
                    line_no,
                    "missing #CHROM header line in VCF",
                ));
            }
            line_no += 1;
            if !line.starts_with('#') {
                return Err(SprimeError::parse(
                    line_no,
                    "data line encountered before #CHROM header line",
                ));
            }
            header_str.push_str(&line);
            if line.starts_with("#CHROM") {
                break;
            }
        }

        let header: Header = header_str
            .parse()
            .map_err(|e: noodles::vcf::header::ParseError| {
                SprimeError::parse(line_no, e.to_string())
            })?;
        let sample_names: Vec<String> = header
            .sample_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let n_header_samples = sample_names.len();

        Ok(Self {
            reader,
            samples: Arc::new(Samples::from_ids(sample_names)),
            n_header_samples,
            include_sample_indices: None,
            exclude_marker_ids: None,
            line_no,
        })
    }

    /// The samples yielded per record, after any exclusion filter
    pub fn samples(&self) -> Arc<Samples> {
        self.samples.clone()
    }

    /// Restrict records to samples whose ids are not in the set
    pub fn set_exclude_samples(&mut self, exclude_ids: &HashSet<String>) {
        if exclude_ids.is_empty() {
            self.include_sample_indices = None;
            return;
        }
        let include_indices: Vec<usize> = self
            .samples
            .ids()
            .iter()
            .enumerate()
            .filter(|(_, id)| !exclude_ids.contains(id.as_ref()))
            .map(|(i, _)| i)
            .collect();
        let filtered_ids: Vec<String> = include_indices
            .iter()
            .map(|&i| self.samples.ids()[i].to_string())
            .collect();
        self.samples = Arc::new(Samples::from_ids(filtered_ids));
        self.include_sample_indices = Some(include_indices);
    }

    /// Skip records whose ID (or `chrom:pos`) is in the set
    pub fn set_exclude_markers(&mut self, exclude_ids: &HashSet<String>) {
        if exclude_ids.is_empty() {
            self.exclude_marker_ids = None;
        } else {
            self.exclude_marker_ids = Some(exclude_ids.clone());
        }
    }

    /// Parse the next record, interning its chromosome name.
    ///
    /// Returns `None` at end of input. Excluded markers are skipped.
    pub fn next_rec(&mut self, chrom_ids: &mut ChromIds) -> Result<Option<GtRec>> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            if let Some(rec) = self.parse_line(line, chrom_ids)? {
                return Ok(Some(rec));
            }
        }
    }

    fn parse_line(&self, line: &str, chrom_ids: &mut ChromIds) -> Result<Option<GtRec>> {
        let fields: Vec<&str> = line.split('\t').collect();
        let expected = 9 + self.n_header_samples;
        if fields.len() != expected {
            return Err(SprimeError::parse(
                self.line_no,
                format!("expected {} tab-delimited fields, found {}", expected, fields.len()),
            ));
        }
        let chrom_name = fields[0];
        let pos: u32 = fields[1].parse().map_err(|_| {
            SprimeError::parse(self.line_no, format!("invalid POS field: {}", fields[1]))
        })?;
        let id = fields[2];

        if let Some(exclude) = &self.exclude_marker_ids {
            if (id != "." && exclude.contains(id))
                || exclude.contains(&format!("{chrom_name}:{pos}"))
            {
                return Ok(None);
            }
        }

        let ref_allele = Allele::from_str(fields[3]);
        let alt_alleles: Vec<Allele> = if fields[4] == "." {
            Vec::new()
        } else {
            fields[4].split(',').map(Allele::from_str).collect()
        };
        let format = fields[8];
        if format != "GT" && !format.starts_with("GT:") {
            return Err(SprimeError::parse(
                self.line_no,
                format!("FORMAT field must lead with GT: {format}"),
            ));
        }

        let chrom = chrom_ids.get_or_insert(chrom_name);
        let marker = Arc::new(Marker::new(
            chrom,
            pos,
            if id == "." { None } else { Some(id.into()) },
            ref_allele,
            alt_alleles,
        ));
        let n_alleles = marker.n_alleles();

        let mut alleles: Vec<i16> = Vec::with_capacity(2 * self.samples.len());
        match &self.include_sample_indices {
            None => {
                for j in 0..self.n_header_samples {
                    let (a1, a2) = self.parse_gt(fields[9 + j], n_alleles)?;
                    alleles.push(a1);
                    alleles.push(a2);
                }
            }
            Some(include) => {
                for &j in include {
                    let (a1, a2) = self.parse_gt(fields[9 + j], n_alleles)?;
                    alleles.push(a1);
                    alleles.push(a2);
                }
            }
        }
        Ok(Some(GtRec::new(marker, alleles)))
    }

    fn parse_gt(&self, sample_field: &str, n_alleles: usize) -> Result<(i16, i16)> {
        let gt = sample_field.split(':').next().unwrap_or("");
        let (a1, a2) = match gt.find(['|', '/']) {
            Some(i) => (&gt[..i], &gt[i + 1..]),
            // haploid call: the second slot is missing
            None => (gt, "."),
        };
        Ok((
            self.parse_allele(a1, n_alleles)?,
            self.parse_allele(a2, n_alleles)?,
        ))
    }

    fn parse_allele(&self, s: &str, n_alleles: usize) -> Result<i16> {
        if s == "." {
            return Ok(MISSING_ALLELE);
        }
        let v: i16 = s.parse().map_err(|_| {
            SprimeError::parse(self.line_no, format!("invalid allele call: {s}"))
        })?;
        if v < 0 || v as usize >= n_alleles {
            return Err(SprimeError::parse(
                self.line_no,
                format!("allele index {v} out of range for {n_alleles} alleles"),
            ));
        }
        Ok(v)
    }
}
