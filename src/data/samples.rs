//! # Sample Identifiers
//!
//! Sample registry with fast id lookup. Replaces `beagleutil/Samples.java`.

use std::collections::HashMap;
use std::sync::Arc;

/// Zero-cost newtype for sample indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleIdx(pub u32);

impl SampleIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// An ordered list of sample identifiers with reverse lookup
#[derive(Clone, Debug, Default)]
pub struct Samples {
    ids: Vec<Arc<str>>,
    index: HashMap<Arc<str>, SampleIdx>,
}

impl Samples {
    /// Create from a list of sample id strings.
    ///
    /// Duplicate ids keep the first index.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let ids: Vec<Arc<str>> = ids.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(ids.len());
        for (j, id) in ids.iter().enumerate() {
            index
                .entry(id.clone())
                .or_insert_with(|| SampleIdx::new(j as u32));
        }
        Self { ids, index }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get a sample id by index
    pub fn id(&self, idx: SampleIdx) -> &str {
        &self.ids[idx.as_usize()]
    }

    /// All sample ids in order
    pub fn ids(&self) -> &[Arc<str>] {
        &self.ids
    }

    /// Look up a sample index by id
    pub fn index_of(&self, id: &str) -> Option<SampleIdx> {
        self.index.get(id).copied()
    }
}
