//! # Score Output and Run Log
//!
//! Collects per-segment variant rows and writes the `.score` and
//! `.log` files. Replaces `sprime/SOutRec.java`.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::data::marker::{ChromIds, Marker};
use crate::error::Result;

/// One variant of one detected segment
#[derive(Clone, Debug)]
pub struct OutRec {
    /// The variant's marker
    pub marker: Arc<Marker>,
    /// The candidate allele index into the marker's allele list
    pub allele: usize,
    /// Index of the segment containing this variant
    pub segment: u32,
    /// The segment score (shared by every member variant)
    pub score: f64,
}

impl OutRec {
    /// Compare by marker, then segment index, then score
    fn cmp(&self, other: &Self) -> Ordering {
        self.marker
            .cmp(&other.marker)
            .then_with(|| self.segment.cmp(&other.segment))
            .then_with(|| self.score.total_cmp(&other.score))
    }
}

/// Header line for the `.score` file
pub fn score_header() -> &'static str {
    "CHROM\tPOS\tID\tREF\tALT\tSEGMENT\tALLELE\tSCORE"
}

fn format_rec(rec: &OutRec, chrom_ids: &ChromIds) -> String {
    let m = &rec.marker;
    let chrom = chrom_ids.name(m.chrom).unwrap_or(".");
    let id = m.id.as_deref().unwrap_or(".");
    let alt = if m.alt_alleles.is_empty() {
        ".".to_string()
    } else {
        m.alt_alleles
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        chrom,
        m.pos,
        id,
        m.ref_allele,
        alt,
        rec.segment,
        rec.allele,
        rec.score.round() as i64
    )
}

/// Stable-sort the records by (marker, segment, score) and write the
/// tab-delimited `.score` file.
pub fn write_score_file(path: &Path, recs: &mut [OutRec], chrom_ids: &ChromIds) -> Result<()> {
    recs.sort_by(OutRec::cmp);
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", score_header())?;
    for rec in recs.iter() {
        writeln!(out, "{}", format_rec(rec, chrom_ids))?;
    }
    out.flush()?;
    Ok(())
}

/// Free-form run log duplicated to a file and to the tracing output
pub struct RunLog {
    out: BufWriter<File>,
}

impl RunLog {
    /// Create the log file, truncating any existing one
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
        })
    }

    /// Write one line to the log file and the console
    pub fn duo(&mut self, line: &str) -> Result<()> {
        tracing::info!("{line}");
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    /// Flush buffered log lines
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::marker::Allele;
    use crate::data::ChromIdx;

    fn out_rec(chrom: u16, pos: u32, segment: u32, score: f64) -> OutRec {
        OutRec {
            marker: Arc::new(Marker::new(
                ChromIdx::new(chrom),
                pos,
                Some("rs1".into()),
                Allele::Base(0),
                vec![Allele::Base(2)],
            )),
            allele: 1,
            segment,
            score,
        }
    }

    #[test]
    fn test_out_rec_ordering() {
        let mut recs = vec![
            out_rec(0, 300, 0, 5.0),
            out_rec(0, 100, 1, 5.0),
            out_rec(0, 100, 0, 5.0),
            out_rec(1, 50, 0, 5.0),
        ];
        recs.sort_by(OutRec::cmp);
        let keys: Vec<(u16, u32, u32)> = recs
            .iter()
            .map(|r| (r.marker.chrom.0, r.marker.pos, r.segment))
            .collect();
        assert_eq!(keys, vec![(0, 100, 0), (0, 100, 1), (0, 300, 0), (1, 50, 0)]);
    }

    #[test]
    fn test_format_rec_rounds_score() {
        let mut ids = ChromIds::new();
        ids.get_or_insert("1");
        let line = format_rec(&out_rec(0, 100, 3, 1234.6), &ids);
        assert_eq!(line, "1\t100\trs1\tA\tG\t3\t1\t1235");
    }
}
