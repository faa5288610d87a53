//! The floating range behind virtual (visual-mode) selection.

use std::ops::Range;

/// A two-endpoint range: one endpoint is fixed where virtual mode was
/// entered, the other follows the cursor every frame.
#[derive(Clone, Copy, Debug)]
pub struct VirtualState {
    fixed: usize,
    moving: usize,
}

impl VirtualState {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            fixed: index,
            moving: index,
        }
    }

    pub fn set_point(&mut self, index: usize) {
        self.moving = index;
    }

    /// Half-open interval covering both endpoints.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        if self.fixed < self.moving {
            self.fixed..self.moving + 1
        } else {
            self.moving..self.fixed + 1
        }
    }

    #[must_use]
    pub fn in_range(&self, index: usize) -> bool {
        self.range().contains(&index)
    }

    /// Clamps both endpoints after the option list shrank, so stale
    /// indices never go out of bounds.
    pub fn truncate(&mut self, len: usize) {
        if len == 0 {
            // the loop fails with Empty before the range is used again
            return;
        }
        self.fixed = self.fixed.min(len - 1);
        self.moving = self.moving.min(len - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_half_open_and_order_free() {
        let mut vs = VirtualState::new(4);
        assert_eq!(vs.range(), 4..5);

        vs.set_point(7);
        assert_eq!(vs.range(), 4..8);

        vs.set_point(1);
        assert_eq!(vs.range(), 1..5);
    }

    #[test]
    fn test_in_range() {
        let mut vs = VirtualState::new(2);
        vs.set_point(5);
        assert!(!vs.in_range(1));
        assert!(vs.in_range(2));
        assert!(vs.in_range(5));
        assert!(!vs.in_range(6));
    }

    #[test]
    fn test_truncate_clamps_both_endpoints() {
        let mut vs = VirtualState::new(3);
        vs.set_point(9);
        vs.truncate(5);
        assert_eq!(vs.range(), 3..5);

        vs.truncate(2);
        assert_eq!(vs.range(), 1..2);
    }

    #[test]
    fn test_truncate_to_empty_is_a_noop() {
        let mut vs = VirtualState::new(3);
        vs.truncate(0);
        assert_eq!(vs.range(), 3..4);
    }
}
