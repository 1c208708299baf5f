//! # Chromosome Windows
//!
//! Streams the variant table one chromosome at a time, turning each
//! buffered chromosome into an array of allele dose records. Replaces
//! `sprime/SWindow.java`.

use rayon::prelude::*;

use crate::config::ChromInterval;
use crate::data::dose::{DoseRec, GtRec};
use crate::data::marker::ChromIds;
use crate::data::ChromIdx;
use crate::error::{Result, SprimeError};
use crate::io::vcf::VcfReader;

/// Per-chromosome dose record builder.
///
/// Records whose alleles exceed the outgroup-frequency ceiling produce
/// no dose record; records with missing allele calls are fatal.
pub struct ChromWindows {
    reader: VcfReader,
    in_outgroup: Vec<bool>,
    n_outgroup: usize,
    n_target: usize,
    /// floor(maxfreq * nOutgroup): maximum outgroup copies of a
    /// candidate allele
    max_cnt: u32,
    interval: Option<ResolvedInterval>,
    pending: Option<GtRec>,
}

/// A chromosome interval with its name resolved to an index
struct ResolvedInterval {
    chrom: ChromIdx,
    start: u32,
    incl_end: u32,
}

impl ChromWindows {
    /// Wrap a reader whose exclusion filters are already configured.
    ///
    /// `outgroup_ids` not present among the reader's samples are
    /// ignored; the remaining samples are targets.
    pub fn new(
        reader: VcfReader,
        outgroup_ids: &std::collections::HashSet<String>,
        maxfreq: f64,
        interval: Option<&ChromInterval>,
        chrom_ids: &mut ChromIds,
    ) -> Result<Self> {
        let samples = reader.samples();
        let in_outgroup: Vec<bool> = samples
            .ids()
            .iter()
            .map(|id| outgroup_ids.contains(id.as_ref()))
            .collect();
        let n_outgroup = in_outgroup.iter().filter(|&&b| b).count();
        let n_target = in_outgroup.len() - n_outgroup;
        let max_cnt = (maxfreq * n_outgroup as f64).floor() as u32;
        let interval = interval.map(|iv| ResolvedInterval {
            chrom: chrom_ids.get_or_insert(&iv.chrom),
            start: iv.start,
            incl_end: iv.incl_end,
        });
        let mut windows = Self {
            reader,
            in_outgroup,
            n_outgroup,
            n_target,
            max_cnt,
            interval,
            pending: None,
        };
        windows.pending = windows.advance(chrom_ids)?;
        Ok(windows)
    }

    /// Whether any record passed the filters
    pub fn has_next(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of outgroup samples
    pub fn n_outgroup_samples(&self) -> usize {
        self.n_outgroup
    }

    /// Number of target samples
    pub fn n_target_samples(&self) -> usize {
        self.n_target
    }

    /// Next record passing the interval filter
    fn advance(&mut self, chrom_ids: &mut ChromIds) -> Result<Option<GtRec>> {
        loop {
            let Some(rec) = self.reader.next_rec(chrom_ids)? else {
                return Ok(None);
            };
            if let Some(iv) = &self.interval {
                let m = rec.marker();
                if m.chrom != iv.chrom || m.pos < iv.start || m.pos > iv.incl_end {
                    continue;
                }
            }
            return Ok(Some(rec));
        }
    }

    /// Buffer the next chromosome's records and build its dose record
    /// array. Returns `None` when the input is exhausted.
    pub fn next_window(&mut self, chrom_ids: &mut ChromIds) -> Result<Option<Vec<DoseRec>>> {
        let Some(first) = self.pending.take() else {
            return Ok(None);
        };
        let chrom = first.marker().chrom;
        let mut buf = vec![first];
        loop {
            match self.advance(chrom_ids)? {
                Some(rec) if rec.marker().chrom == chrom => buf.push(rec),
                other => {
                    self.pending = other;
                    break;
                }
            }
        }
        let chrom_name = chrom_ids.name(chrom).unwrap_or("?").to_string();
        let in_outgroup = &self.in_outgroup;
        let max_cnt = self.max_cnt;
        let per_rec: Vec<Vec<DoseRec>> = buf
            .par_iter()
            .map(|rec| process_rec(rec, in_outgroup, max_cnt, &chrom_name))
            .collect::<Result<_>>()?;
        Ok(Some(per_rec.into_iter().flatten().collect()))
    }
}

/// Dose records for every candidate allele of one record
fn process_rec(
    rec: &GtRec,
    in_outgroup: &[bool],
    max_cnt: u32,
    chrom_name: &str,
) -> Result<Vec<DoseRec>> {
    if rec.has_missing_allele() {
        return Err(SprimeError::vcf(format!(
            "VCF record has missing alleles: CHROM={} POS={}",
            chrom_name,
            rec.marker().pos
        )));
    }
    let mut al_cnts = vec![0u32; rec.marker().n_alleles()];
    for (s, &is_outgroup) in in_outgroup.iter().enumerate() {
        if is_outgroup {
            al_cnts[rec.allele1(s) as usize] += 1;
            al_cnts[rec.allele2(s) as usize] += 1;
        }
    }
    let mut out = Vec::new();
    for (al, &cnt) in al_cnts.iter().enumerate() {
        if cnt <= max_cnt {
            out.push(DoseRec::new(rec, al, in_outgroup)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const HEADER: &str = "##fileformat=VCFv4.2\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tT1\tT2\tO1\tO2\n";

    fn windows(
        body: &str,
        interval: Option<&ChromInterval>,
        chrom_ids: &mut ChromIds,
    ) -> ChromWindows {
        let text = format!("{HEADER}{body}");
        let reader =
            VcfReader::from_reader(Box::new(std::io::Cursor::new(text.into_bytes()))).unwrap();
        let outgroup = HashSet::from(["O1".to_string(), "O2".to_string()]);
        ChromWindows::new(reader, &outgroup, 0.01, interval, chrom_ids).unwrap()
    }

    #[test]
    fn test_sample_partition() {
        let mut ids = ChromIds::new();
        let w = windows("", None, &mut ids);
        assert_eq!(w.n_outgroup_samples(), 2);
        assert_eq!(w.n_target_samples(), 2);
    }

    #[test]
    fn test_chromosome_grouping() {
        let body = "1\t100\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n\
                    1\t200\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n\
                    2\t100\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n";
        let mut ids = ChromIds::new();
        let mut w = windows(body, None, &mut ids);
        let win1 = w.next_window(&mut ids).unwrap().unwrap();
        // maxfreq 0.01 of 2 outgroup samples: max_cnt = 0, so the REF
        // allele (4 outgroup copies) is filtered and ALT kept
        assert_eq!(win1.len(), 2);
        assert!(win1.iter().all(|r| r.allele() == 1));
        let win2 = w.next_window(&mut ids).unwrap().unwrap();
        assert_eq!(win2.len(), 1);
        assert!(w.next_window(&mut ids).unwrap().is_none());
    }

    #[test]
    fn test_outgroup_frequent_allele_filtered() {
        // ALT carried by one outgroup sample: outgroup count 1 > max_cnt 0
        let body = "1\t100\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|1\t0|0\n";
        let mut ids = ChromIds::new();
        let mut w = windows(body, None, &mut ids);
        let win = w.next_window(&mut ids).unwrap().unwrap();
        assert!(win.is_empty());
    }

    #[test]
    fn test_missing_allele_is_fatal() {
        let body = "1\t100\t.\tA\tC\t.\t.\t.\tGT\t0|.\t0|1\t0|0\t0|0\n";
        let mut ids = ChromIds::new();
        let mut w = windows(body, None, &mut ids);
        assert!(matches!(
            w.next_window(&mut ids),
            Err(SprimeError::Vcf { .. })
        ));
    }

    #[test]
    fn test_interval_filter() {
        let body = "1\t100\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n\
                    1\t200\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n\
                    2\t150\t.\tA\tC\t.\t.\t.\tGT\t0|1\t0|1\t0|0\t0|0\n";
        let iv = ChromInterval {
            chrom: "1".to_string(),
            start: 150,
            incl_end: 250,
        };
        let mut ids = ChromIds::new();
        let mut w = windows(body, Some(&iv), &mut ids);
        let win = w.next_window(&mut ids).unwrap().unwrap();
        assert_eq!(win.len(), 1);
        assert_eq!(win[0].pos(), 200);
        assert!(w.next_window(&mut ids).unwrap().is_none());
    }
}
