//! # Marker Definitions
//!
//! Genomic marker (variant site) representation. Replaces `vcf/Marker.java`
//! and the `ChromIds` registry.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::data::ChromIdx;

/// Allele representation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Allele {
    /// Single nucleotide (A=0, C=1, G=2, T=3)
    Base(u8),
    /// Insertion/deletion or complex variant
    Seq(Arc<str>),
    /// Missing data marker
    Missing,
}

impl Allele {
    /// Create allele from a single character
    pub fn from_char(c: char) -> Self {
        match c {
            'A' | 'a' => Self::Base(0),
            'C' | 'c' => Self::Base(1),
            'G' | 'g' => Self::Base(2),
            'T' | 't' => Self::Base(3),
            'N' | 'n' | '.' | '*' => Self::Missing,
            _ => Self::Seq(c.to_string().into()),
        }
    }

    /// Create allele from a string
    pub fn from_str(s: &str) -> Self {
        if s.len() == 1 {
            Self::from_char(s.chars().next().unwrap())
        } else if s == "." || s == "*" || s == "<*>" || s == "<NON_REF>" {
            Self::Missing
        } else {
            Self::Seq(s.into())
        }
    }

    /// Check if this is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The allele's string form, as written in a VCF column
    fn as_str(&self) -> &str {
        match self {
            Self::Base(0) => "A",
            Self::Base(1) => "C",
            Self::Base(2) => "G",
            Self::Base(3) => "T",
            Self::Base(_) => "N",
            Self::Seq(s) => s,
            Self::Missing => ".",
        }
    }
}

impl std::fmt::Display for Allele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialOrd for Allele {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Allele {
    /// Lexicographic order on the allele's string form
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// A genomic marker (variant site)
#[derive(Clone, Debug)]
pub struct Marker {
    /// Chromosome index
    pub chrom: ChromIdx,
    /// 1-based genomic position
    pub pos: u32,
    /// Variant ID (rsID or similar), None if missing
    pub id: Option<Arc<str>>,
    /// Reference allele
    pub ref_allele: Allele,
    /// Alternate allele(s)
    pub alt_alleles: Vec<Allele>,
}

impl Marker {
    /// Create a new marker
    pub fn new(
        chrom: ChromIdx,
        pos: u32,
        id: Option<Arc<str>>,
        ref_allele: Allele,
        alt_alleles: Vec<Allele>,
    ) -> Self {
        Self {
            chrom,
            pos,
            id,
            ref_allele,
            alt_alleles,
        }
    }

    /// Total number of alleles (ref + alts)
    pub fn n_alleles(&self) -> usize {
        1 + self.alt_alleles.len()
    }

    /// Get allele by index (0 = ref, 1+ = alt)
    pub fn allele(&self, idx: usize) -> Option<&Allele> {
        if idx == 0 {
            Some(&self.ref_allele)
        } else {
            self.alt_alleles.get(idx - 1)
        }
    }

    fn allele_list_cmp(&self, other: &Self) -> Ordering {
        match self.ref_allele.cmp(&other.ref_allele) {
            Ordering::Equal => self.alt_alleles.cmp(&other.alt_alleles),
            ord => ord,
        }
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Marker {}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Marker {
    /// Chromosome index, then position, then allele list
    fn cmp(&self, other: &Self) -> Ordering {
        self.chrom
            .cmp(&other.chrom)
            .then_with(|| self.pos.cmp(&other.pos))
            .then_with(|| self.allele_list_cmp(other))
    }
}

/// Interning registry mapping chromosome names to dense indices.
///
/// The density pass, the window pass, and the genetic map all intern
/// names through one registry so their `ChromIdx` values agree.
#[derive(Clone, Debug, Default)]
pub struct ChromIds {
    names: Vec<Arc<str>>,
    index: HashMap<Arc<str>, ChromIdx>,
}

impl ChromIds {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for a chromosome name, interning it if new
    pub fn get_or_insert(&mut self, name: &str) -> ChromIdx {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = ChromIdx::new(self.names.len() as u16);
        let name: Arc<str> = name.into();
        self.names.push(name.clone());
        self.index.insert(name, idx);
        idx
    }

    /// Return the index for a chromosome name if it has been interned
    pub fn get(&self, name: &str) -> Option<ChromIdx> {
        self.index.get(name).copied()
    }

    /// Return the name for a chromosome index
    pub fn name(&self, idx: ChromIdx) -> Option<&str> {
        self.names.get(idx.as_usize()).map(|s| s.as_ref())
    }

    /// Number of interned chromosomes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
