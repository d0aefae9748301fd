use std::ops::Range;

use crate::error::IndexOutOfRange;
use crate::rng::SmallRng;

// ---------------------------------------------------------------------------
// Sample selection – the only mutable session state
// ---------------------------------------------------------------------------

/// Currently selected sample within a bundle of `len` samples.
///
/// Every mutation either leaves `current` unchanged or overwrites it
/// whole; an out-of-range request is rejected, never clamped, so a broken
/// selection widget fails loudly instead of silently snapping to an edge.
#[derive(Debug, Clone)]
pub struct SampleSelection {
    len: usize,
    current: usize,
}

impl SampleSelection {
    /// Start at sample 0. The loader rejects empty test sets, so `len`
    /// is at least 1 by the time a selection exists.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "selection over an empty test set");
        SampleSelection { len, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// The indices a caller may select.
    pub fn valid_range(&self) -> Range<usize> {
        0..self.len
    }

    /// Select an explicit index, returning the new current index.
    pub fn select(&mut self, requested: usize) -> Result<usize, IndexOutOfRange> {
        if requested >= self.len {
            return Err(IndexOutOfRange {
                requested,
                len: self.len,
            });
        }
        self.current = requested;
        Ok(self.current)
    }

    /// Select a uniformly drawn index.
    pub fn select_random(&mut self, rng: &mut SmallRng) -> usize {
        self.current = rng.next_below(self.len);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_in_range_updates_current() {
        let mut sel = SampleSelection::new(5);
        assert_eq!(sel.select(3), Ok(3));
        assert_eq!(sel.current(), 3);
    }

    #[test]
    fn select_at_len_fails_and_leaves_current() {
        let mut sel = SampleSelection::new(5);
        sel.select(2).unwrap();
        assert_eq!(
            sel.select(5),
            Err(IndexOutOfRange { requested: 5, len: 5 })
        );
        assert_eq!(sel.current(), 2);
    }

    #[test]
    fn select_far_out_of_range_fails() {
        let mut sel = SampleSelection::new(5);
        assert!(sel.select(usize::MAX).is_err());
    }

    #[test]
    fn valid_range_covers_all_samples() {
        let sel = SampleSelection::new(3);
        assert_eq!(sel.valid_range(), 0..3);
    }

    #[test]
    fn random_selection_stays_in_range() {
        let mut rng = SmallRng::new(7);
        let mut sel = SampleSelection::new(11);
        for _ in 0..500 {
            let idx = sel.select_random(&mut rng);
            assert!(idx < 11);
            assert_eq!(idx, sel.current());
        }
    }

    #[test]
    fn random_selection_on_singleton_is_zero() {
        let mut rng = SmallRng::new(1);
        let mut sel = SampleSelection::new(1);
        for _ in 0..20 {
            assert_eq!(sel.select_random(&mut rng), 0);
        }
    }
}
