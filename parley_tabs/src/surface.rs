// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry capability the engine and controller depend on.

use core::ops::Range;

use embed_text::{BlockPos, Document, EmbedId};

use crate::{TabPlacement, TextMeasurer};

/// A position relative to the top-left corner of a block.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal distance from the block start.
    pub x: f32,
    /// Vertical distance from the block top.
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Why a visual line ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineEnd {
    /// Automatic wrapping; the next line continues at `end`.
    Wrap,
    /// A soft break unit sits at `end`.
    SoftBreak,
    /// The end of the block.
    BlockEnd,
}

/// One rendered line of a block.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualLine {
    /// Index of the block.
    pub block: usize,
    /// Offset of the first unit on the line.
    pub start: usize,
    /// Offset one past the last content unit on the line.
    pub end: usize,
    /// Why the line ended.
    pub ends_with: LineEnd,
}

impl VisualLine {
    /// Offsets of the units on this line, including a terminating soft break.
    pub fn units(&self) -> Range<usize> {
        match self.ends_with {
            LineEnd::SoftBreak => self.start..self.end + 1,
            LineEnd::Wrap | LineEnd::BlockEnd => self.start..self.end,
        }
    }

    /// Caret offsets that are drawn on this line.
    ///
    /// The offset at a wrap point belongs to the following line.
    pub fn caret_offsets(&self) -> Range<usize> {
        match self.ends_with {
            LineEnd::Wrap => self.start..self.end,
            LineEnd::SoftBreak | LineEnd::BlockEnd => self.start..self.end + 1,
        }
    }

    /// Returns `true` if `pos` is drawn on this line.
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.block == self.block && self.caret_offsets().contains(&pos.offset)
    }
}

/// Live geometry of a rendered document.
///
/// Queries reflect every placement written so far: after
/// [`set_tab_placement`](Self::set_tab_placement), positions of later content
/// must account for the new width. Queries return `None` when geometry is
/// unavailable, for example on a detached surface.
pub trait LayoutSurface: TextMeasurer {
    /// Top-left of the first fragment of run `run` in block `block`.
    fn run_origin(&mut self, doc: &Document, block: usize, run: usize) -> Option<Point>;

    /// Height of one line in block `block`.
    fn line_height(&mut self, doc: &Document, block: usize) -> Option<f32>;

    /// Write the layout of a tab onto its rendered node.
    fn set_tab_placement(&mut self, id: EmbedId, placement: TabPlacement);

    /// The layout last written for a tab.
    fn tab_placement(&self, id: EmbedId) -> Option<TabPlacement>;

    /// Forget the layout of every tab for which `keep` returns `false`.
    ///
    /// Called at the end of each pass with the tabs still in the document.
    fn retain_placements(&mut self, keep: &mut dyn FnMut(EmbedId) -> bool);

    /// Every visual line of the document, in order.
    fn visual_lines(&mut self, doc: &Document) -> Vec<VisualLine>;

    /// Horizontal caret position at `pos`, relative to its block.
    fn caret_x(&mut self, doc: &Document, pos: BlockPos) -> Option<f32>;
}
