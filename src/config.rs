//! # Configuration Logic
//!
//! CLI argument parsing and validation using clap derive.
//! Replaces `sprime/SPar.java`.

use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, SprimeError};

/// rsprime: detection of archaic introgression from rare-variant sharing
#[derive(Parser, Debug, Clone)]
#[command(name = "rsprime")]
#[command(author = "rsprime Authors")]
#[command(version = "0.1.0")]
#[command(about = "Detection of archaic introgression from rare-variant sharing", long_about = None)]
pub struct Config {
    // ============ Data Parameters ============
    /// Input VCF file with GT FORMAT field and no missing genotypes (required)
    #[arg(long, value_name = "FILE")]
    pub gt: PathBuf,

    /// File with one outgroup sample ID per line (required)
    #[arg(long, value_name = "FILE")]
    pub outgroup: PathBuf,

    /// PLINK map file with cM units (required)
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Output file prefix (required)
    #[arg(long, short, value_name = "PREFIX")]
    pub out: PathBuf,

    /// File with sample IDs to exclude (one per line)
    #[arg(long, value_name = "FILE")]
    pub excludesamples: Option<PathBuf>,

    /// File with marker IDs to exclude (one per line)
    #[arg(long, value_name = "FILE")]
    pub excludemarkers: Option<PathBuf>,

    /// Chromosome or region [chrom] or [chrom]:[start]-[end]
    #[arg(long, value_name = "REGION")]
    pub chrom: Option<String>,

    // ============ Algorithm Parameters ============
    /// Maximum variant frequency in the outgroup
    #[arg(long, default_value = "0.01")]
    pub maxfreq: f64,

    /// Minimum score of an introgressed segment
    #[arg(long, default_value = "100000")]
    pub minscore: f64,

    /// Mutation rate (mutations/bp/meiosis)
    #[arg(long, default_value = "1.2e-8")]
    pub mu: f64,

    // ============ General Parameters ============
    /// Number of threads (default: all available cores)
    #[arg(long)]
    pub nthreads: Option<usize>,
}

/// A chromosome or a closed interval of one chromosome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromInterval {
    /// Chromosome identifier as written in the variant table
    pub chrom: String,
    /// Inclusive start (0 when open on the left)
    pub start: u32,
    /// Inclusive end (`u32::MAX` when open on the right)
    pub incl_end: u32,
}

impl ChromInterval {
    /// Parse `[chrom]` or `[chrom]:[start]-[end]`; a missing bound
    /// leaves that end open.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let Some((chrom, range)) = s.split_once(':') else {
            return Some(Self {
                chrom: s.to_string(),
                start: 0,
                incl_end: u32::MAX,
            });
        };
        if chrom.is_empty() {
            return None;
        }
        let (start_str, end_str) = range.split_once('-')?;
        let start = if start_str.is_empty() {
            0
        } else {
            start_str.parse().ok()?
        };
        let incl_end = if end_str.is_empty() {
            u32::MAX
        } else {
            end_str.parse().ok()?
        };
        if start > incl_end {
            return None;
        }
        Some(Self {
            chrom: chrom.to_string(),
            start,
            incl_end,
        })
    }
}

impl Config {
    /// Parse command line arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// The parsed chrom parameter, if any
    pub fn chrom_interval(&self) -> Option<ChromInterval> {
        self.chrom.as_deref().and_then(ChromInterval::parse)
    }

    /// Path of the `.score` output file
    pub fn score_path(&self) -> PathBuf {
        append_ext(&self.out, ".score")
    }

    /// Path of the `.log` output file
    pub fn log_path(&self) -> PathBuf {
        append_ext(&self.out, ".log")
    }

    /// Load sample IDs to exclude from the exclusion file.
    ///
    /// Returns an empty set if no exclusion file is specified.
    pub fn load_exclude_samples(&self) -> Result<HashSet<String>> {
        load_id_set(self.excludesamples.as_deref())
    }

    /// Load marker IDs to exclude from the exclusion file.
    ///
    /// Returns an empty set if no exclusion file is specified.
    pub fn load_exclude_markers(&self) -> Result<HashSet<String>> {
        load_id_set(self.excludemarkers.as_deref())
    }

    /// Load the outgroup sample ID set
    pub fn load_outgroup(&self) -> Result<HashSet<String>> {
        load_id_set(Some(&self.outgroup))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.maxfreq) {
            return Err(SprimeError::config(
                "The 'maxfreq' parameter must be in [0, 1]",
            ));
        }
        if !self.mu.is_finite() || self.mu <= 0.0 {
            return Err(SprimeError::config("The 'mu' parameter must be positive"));
        }
        if !self.minscore.is_finite() {
            return Err(SprimeError::config("The 'minscore' parameter must be finite"));
        }
        if let Some(chrom) = &self.chrom {
            if ChromInterval::parse(chrom).is_none() {
                return Err(SprimeError::config(format!(
                    "invalid 'chrom' parameter: \"{chrom}\""
                )));
            }
        }

        for path in [Some(&self.gt), Some(&self.outgroup), Some(&self.map)]
            .into_iter()
            .flatten()
            .chain(self.excludesamples.as_ref())
            .chain(self.excludemarkers.as_ref())
        {
            if !path.exists() {
                return Err(SprimeError::FileNotFound { path: path.clone() });
            }
        }

        // Check output prefix is not a directory
        if self.out.is_dir() {
            return Err(SprimeError::config(format!(
                "'out' parameter cannot be a directory: {:?}",
                self.out
            )));
        }

        // Check output files do not overwrite an input file
        for out_path in [self.score_path(), self.log_path()] {
            let inputs = [
                Some(&self.gt),
                Some(&self.outgroup),
                Some(&self.map),
                self.excludesamples.as_ref(),
                self.excludemarkers.as_ref(),
            ];
            for input in inputs.into_iter().flatten() {
                if &out_path == input {
                    return Err(SprimeError::config(format!(
                        "output file equals input file: {out_path:?}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Get the number of threads to use
    pub fn nthreads(&self) -> usize {
        self.nthreads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// `prefix` + extension, preserving any existing extension in `prefix`
fn append_ext(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}

fn load_id_set(path: Option<&Path>) -> Result<HashSet<String>> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let mut set = HashSet::new();
    if let Some(path) = path {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line?;
            let id = line.trim();
            if !id.is_empty() && !id.starts_with('#') {
                set.insert(id.to_string());
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A config with placeholder paths; the numeric guards run before
    /// any file-existence check
    fn numeric_config(maxfreq: f64, minscore: f64, mu: f64) -> Config {
        Config {
            gt: PathBuf::from("in.vcf"),
            outgroup: PathBuf::from("outgroup.txt"),
            map: PathBuf::from("plink.map"),
            out: PathBuf::from("out"),
            excludesamples: None,
            excludemarkers: None,
            chrom: None,
            maxfreq,
            minscore,
            mu,
            nthreads: None,
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_maxfreq() {
        for maxfreq in [-0.1, 1.5, f64::NAN] {
            let cfg = numeric_config(maxfreq, 100_000.0, 1.2e-8);
            assert!(matches!(cfg.validate(), Err(SprimeError::Config { .. })));
        }
    }

    #[test]
    fn test_validate_rejects_non_positive_mu() {
        for mu in [0.0, -1.2e-8, f64::NAN, f64::INFINITY] {
            let cfg = numeric_config(0.01, 100_000.0, mu);
            assert!(matches!(cfg.validate(), Err(SprimeError::Config { .. })));
        }
    }

    #[test]
    fn test_validate_rejects_non_finite_minscore() {
        for minscore in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let cfg = numeric_config(0.01, minscore, 1.2e-8);
            assert!(matches!(cfg.validate(), Err(SprimeError::Config { .. })));
        }
    }

    #[test]
    fn test_chrom_interval_whole_chromosome() {
        let iv = ChromInterval::parse("17").unwrap();
        assert_eq!(iv.chrom, "17");
        assert_eq!(iv.start, 0);
        assert_eq!(iv.incl_end, u32::MAX);
    }

    #[test]
    fn test_chrom_interval_closed() {
        let iv = ChromInterval::parse("1:1000-2000").unwrap();
        assert_eq!((iv.chrom.as_str(), iv.start, iv.incl_end), ("1", 1000, 2000));
    }

    #[test]
    fn test_chrom_interval_open_ends() {
        let iv = ChromInterval::parse("1:1000-").unwrap();
        assert_eq!((iv.start, iv.incl_end), (1000, u32::MAX));
        let iv = ChromInterval::parse("1:-2000").unwrap();
        assert_eq!((iv.start, iv.incl_end), (0, 2000));
    }

    #[test]
    fn test_chrom_interval_invalid() {
        assert!(ChromInterval::parse("").is_none());
        assert!(ChromInterval::parse("1:abc-200").is_none());
        assert!(ChromInterval::parse("1:200").is_none());
        assert!(ChromInterval::parse("1:300-200").is_none());
        assert!(ChromInterval::parse(":100-200").is_none());
    }

    #[test]
    fn test_append_ext() {
        assert_eq!(
            append_ext(Path::new("run/out"), ".score"),
            PathBuf::from("run/out.score")
        );
        assert_eq!(
            append_ext(Path::new("out.v1"), ".log"),
            PathBuf::from("out.v1.log")
        );
    }
}
