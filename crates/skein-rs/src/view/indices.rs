//! Safe-index sets and the manipulation index calculator.
//!
//! Every view property reports the positions at which the raw sequence may
//! be cut or extended without violating its invariant, as an [`IndexSet`]
//! over `0..=n` (position `n` means "after the last event"). The calculator
//! intersects the per-property sets into one sorted list and answers
//! cut-point queries by binary search.
//!
//! [`IndexSet`] is a fixed-width bitset: intersection is a word-wise AND,
//! which beats hash-set intersection by a wide margin on the tens of
//! thousands of positions a long trace produces.

use crate::event::Event;
use crate::view::property::ViewProperty;
use std::ops::Range;
use tracing::trace;

const WORD_BITS: usize = u64::BITS as usize;

/// A set of positions in `0..=sequence_len`, backed by a bitset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    bits: Vec<u64>,
    /// Number of representable positions (`sequence_len + 1`).
    positions: usize,
}

impl IndexSet {
    /// The full set `{0, 1, …, sequence_len}`.
    pub fn full(sequence_len: usize) -> Self {
        let positions = sequence_len + 1;
        let words = positions.div_ceil(WORD_BITS);
        let mut bits = vec![u64::MAX; words];

        // Clear the tail beyond the last valid position.
        let tail = positions % WORD_BITS;
        if tail != 0
            && let Some(last) = bits.last_mut()
        {
            *last = (1u64 << tail) - 1;
        }

        Self { bits, positions }
    }

    /// The empty set over the same position range.
    pub fn empty(sequence_len: usize) -> Self {
        let positions = sequence_len + 1;
        Self {
            bits: vec![0; positions.div_ceil(WORD_BITS)],
            positions,
        }
    }

    /// Number of representable positions (`sequence_len + 1`).
    pub fn positions(&self) -> usize {
        self.positions
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.positions && self.bits[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.positions {
            self.bits[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Remove every position in `range` (clamped to the valid span).
    pub fn remove_range(&mut self, range: Range<usize>) {
        let end = range.end.min(self.positions);
        for index in range.start..end {
            self.remove(index);
        }
    }

    /// Intersect in place. Both sets must cover the same sequence.
    pub fn intersect_with(&mut self, other: &IndexSet) {
        debug_assert_eq!(self.positions, other.positions);
        for (word, other_word) in self.bits.iter_mut().zip(&other.bits) {
            *word &= other_word;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate set positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(wi, &word)| {
            let base = wi * WORD_BITS;
            (0..WORD_BITS)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| base + bit)
        })
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

/// The sorted intersection of every property's safe indices over one raw
/// sequence.
///
/// Indices are valid only for the sequence they were computed from; append
/// an event and they must be recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManipulationIndices {
    indices: Vec<usize>,
    sequence_len: usize,
}

impl ManipulationIndices {
    /// Intersect the safe-index sets of `properties` over `events`.
    ///
    /// With zero properties every position `0..=n` is safe.
    pub fn compute(properties: &[&dyn ViewProperty], events: &[Event]) -> Self {
        let mut safe = IndexSet::full(events.len());
        for property in properties {
            let property_safe = property.safe_indices(events);
            trace!(
                property = property.name(),
                safe = property_safe.count(),
                "safe indices"
            );
            safe.intersect_with(&property_safe);
        }
        Self {
            indices: safe.to_vec(),
            sequence_len: events.len(),
        }
    }

    /// Build from an already-sorted index list (test and replay tooling).
    pub fn from_sorted(indices: Vec<usize>, sequence_len: usize) -> Self {
        debug_assert!(indices.is_sorted());
        Self {
            indices,
            sequence_len,
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Length of the raw sequence these indices were computed over.
    pub fn sequence_len(&self) -> usize {
        self.sequence_len
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// The smallest safe index `>= threshold` (`> threshold` when
    /// `strict`). Clips to the largest safe index when none qualifies, and
    /// to the sequence length when no safe indices exist at all.
    pub fn next_index(&self, threshold: usize, strict: bool) -> usize {
        let at = self.indices.partition_point(|&i| {
            if strict {
                i <= threshold
            } else {
                i < threshold
            }
        });
        match self.indices.get(at) {
            Some(&index) => index,
            None => self
                .indices
                .last()
                .copied()
                .unwrap_or(self.sequence_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_covers_zero_through_n() {
        let set = IndexSet::full(5);
        assert_eq!(set.to_vec(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(set.count(), 6);
        assert!(!set.contains(6));
    }

    #[test]
    fn full_set_word_boundaries() {
        // n = 63 → 64 positions, exactly one word.
        assert_eq!(IndexSet::full(63).count(), 64);
        // n = 64 → 65 positions, spills into a second word.
        let set = IndexSet::full(64);
        assert_eq!(set.count(), 65);
        assert!(set.contains(64));
        assert!(!set.contains(65));
    }

    #[test]
    fn empty_sequence_has_single_position() {
        let set = IndexSet::full(0);
        assert_eq!(set.to_vec(), vec![0]);
    }

    #[test]
    fn remove_and_remove_range() {
        let mut set = IndexSet::full(6);
        set.remove(3);
        set.remove_range(5..7);
        assert_eq!(set.to_vec(), vec![0, 1, 2, 4]);

        // Out-of-range removals are ignored.
        set.remove(100);
        set.remove_range(90..95);
        assert_eq!(set.count(), 4);
    }

    #[test]
    fn intersection_is_word_wise() {
        let mut a = IndexSet::full(70);
        let mut b = IndexSet::full(70);
        a.remove_range(0..10);
        b.remove_range(60..71);
        a.intersect_with(&b);
        assert_eq!(a.to_vec(), (10..60).collect::<Vec<_>>());
    }

    #[test]
    fn next_index_picks_smallest_at_or_after() {
        let indices = ManipulationIndices::from_sorted(vec![0, 3, 7, 10], 10);
        assert_eq!(indices.next_index(0, false), 0);
        assert_eq!(indices.next_index(1, false), 3);
        assert_eq!(indices.next_index(3, false), 3);
        assert_eq!(indices.next_index(3, true), 7);
        assert_eq!(indices.next_index(8, false), 10);
    }

    #[test]
    fn next_index_clips_to_end() {
        let indices = ManipulationIndices::from_sorted(vec![0, 3, 7], 10);
        assert_eq!(indices.next_index(8, false), 7);
        assert_eq!(indices.next_index(7, true), 7);
    }

    #[test]
    fn next_index_empty_falls_back_to_len() {
        let indices = ManipulationIndices::from_sorted(vec![], 4);
        assert_eq!(indices.next_index(2, false), 4);
    }

    #[test]
    fn compute_with_zero_properties_is_full_range() {
        let events = vec![
            crate::event::Event::user_message("e1", "a"),
            crate::event::Event::user_message("e2", "b"),
        ];
        let indices = ManipulationIndices::compute(&[], &events);
        assert_eq!(indices.as_slice(), &[0, 1, 2]);
        assert_eq!(indices.sequence_len(), 2);
    }
}
