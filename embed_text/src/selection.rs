// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// A selection expressed in linear document offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: usize,
    focus: usize,
}

impl Selection {
    /// Creates a selection from an anchor and a focus offset.
    pub const fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// Creates a collapsed selection (a caret) at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Where the selection was initiated.
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    /// The moving end of the selection; the caret position when collapsed.
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Returns true if the anchor and focus are the same.
    pub const fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The selected range, ordered.
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.focus)..self.anchor.max(self.focus)
    }

    /// Adjust for `len` units inserted at `at`.
    ///
    /// Offsets after the insertion point move forward; an offset exactly at the
    /// insertion point stays put.
    #[must_use]
    pub(crate) fn map_insert(self, at: usize, len: usize) -> Self {
        let map = |offset: usize| if offset > at { offset + len } else { offset };
        Self::new(map(self.anchor), map(self.focus))
    }

    /// Adjust for the removal of `range`.
    #[must_use]
    pub(crate) fn map_delete(self, range: Range<usize>) -> Self {
        let map = |offset: usize| {
            if offset >= range.end {
                offset - range.len()
            } else {
                offset.min(range.start)
            }
        };
        Self::new(map(self.anchor), map(self.focus))
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn range_is_ordered() {
        assert_eq!(Selection::new(7, 3).range(), 3..7);
        assert!(Selection::caret(4).is_collapsed());
    }

    #[test]
    fn insert_before_caret_shifts_it() {
        let sel = Selection::caret(5).map_insert(2, 3);
        assert_eq!(sel, Selection::caret(8));
        let sel = Selection::caret(5).map_insert(5, 3);
        assert_eq!(sel, Selection::caret(5));
    }

    #[test]
    fn delete_around_selection_clamps() {
        let sel = Selection::new(2, 9).map_delete(4..6);
        assert_eq!(sel, Selection::new(2, 7));
        let sel = Selection::caret(5).map_delete(3..8);
        assert_eq!(sel, Selection::caret(3));
    }
}
