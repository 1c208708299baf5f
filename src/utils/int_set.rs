//! # Indexed Integer Set
//!
//! A set of non-negative integers with O(1) membership and positional
//! access. Replaces `blbutil/IntSet.java`.
//!
//! Backed by a dense element vector plus an element-to-slot hash map.
//! Removal swaps with the last element, which invalidates the positional
//! index of only the moved element; callers must not interleave mutation
//! with positional iteration.

use std::collections::HashMap;

/// An indexed set of non-negative integers
#[derive(Clone, Debug, Default)]
pub struct IntSet {
    slots: HashMap<u32, u32>,
    elements: Vec<u32>,
}

impl IntSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Add an element. Returns `true` if the set changed.
    pub fn add(&mut self, element: u32) -> bool {
        if self.slots.contains_key(&element) {
            return false;
        }
        self.slots.insert(element, self.elements.len() as u32);
        self.elements.push(element);
        true
    }

    /// Remove an element by swapping with the last. Returns `true` if
    /// the set changed.
    pub fn remove(&mut self, element: u32) -> bool {
        let Some(slot) = self.slots.remove(&element) else {
            return false;
        };
        let last = self.elements.len() - 1;
        self.elements.swap_remove(slot as usize);
        if (slot as usize) < last {
            self.slots.insert(self.elements[slot as usize], slot);
        }
        true
    }

    /// Membership test
    pub fn contains(&self, element: u32) -> bool {
        self.slots.contains_key(&element)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element at a positional index in `[0, len)`
    pub fn element(&self, index: usize) -> u32 {
        self.elements[index]
    }

    /// Iterate over elements in positional order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().copied()
    }

    /// The elements as a slice in positional order
    pub fn as_slice(&self) -> &[u32] {
        &self.elements
    }

    /// Remove all elements
    pub fn clear(&mut self) {
        self.slots.clear();
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_contains() {
        let mut set = IntSet::new();
        assert!(set.add(7));
        assert!(!set.add(7));
        assert!(set.add(3));
        assert!(set.contains(7));
        assert!(set.contains(3));
        assert!(!set.contains(5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_positional_iteration_preserves_insertion_order() {
        let mut set = IntSet::new();
        for e in [9, 2, 5] {
            set.add(e);
        }
        let elems: Vec<u32> = (0..set.len()).map(|j| set.element(j)).collect();
        assert_eq!(elems, vec![9, 2, 5]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![9, 2, 5]);
    }

    #[test]
    fn test_remove_swaps_with_last() {
        let mut set = IntSet::new();
        for e in [9, 2, 5] {
            set.add(e);
        }
        assert!(set.remove(9));
        assert!(!set.remove(9));
        assert!(!set.contains(9));
        assert_eq!(set.len(), 2);
        // the last element moved into the vacated slot
        assert_eq!(set.element(0), 5);
        assert!(set.contains(2) && set.contains(5));
    }

    #[test]
    fn test_remove_last_element() {
        let mut set = IntSet::new();
        set.add(1);
        set.add(2);
        assert!(set.remove(2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.element(0), 1);
    }

    #[test]
    fn test_clear() {
        let mut set = IntSet::new();
        set.add(4);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(4));
    }
}
