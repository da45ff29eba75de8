// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::iter;
use core::ops::Range;

use embed_text::{BlockPos, ChangeSource, Document, Embed, Error, Selection, Unit};

use crate::{LayoutSurface, TabStopRegistry};

use super::Handled;

/// Direction of vertical caret motion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    /// Towards the previous visual line.
    Up,
    /// Towards the next visual line.
    Down,
}

/// Everything an editing command needs for one key press.
///
/// This type is only used to simplify methods which require the document,
/// the stop registry, and live geometry at the same time.
pub struct EditContext<'a, S: ?Sized> {
    /// The document being edited.
    pub doc: &'a mut Document,
    /// The tab stops in effect.
    pub stops: &'a TabStopRegistry,
    /// Geometry of the rendered document.
    pub surface: &'a mut S,
    relayout: bool,
}

impl<S: ?Sized> fmt::Debug for EditContext<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditContext")
            .field("doc", &self.doc)
            .field("stops", &self.stops)
            .field("relayout", &self.relayout)
            .finish_non_exhaustive()
    }
}

impl<'a, S: LayoutSurface + ?Sized> EditContext<'a, S> {
    /// Create a context.
    pub fn new(doc: &'a mut Document, stops: &'a TabStopRegistry, surface: &'a mut S) -> Self {
        Self {
            doc,
            stops,
            surface,
            relayout: false,
        }
    }

    /// Returns `true` if a command changed content and tab layout must be
    /// recomputed.
    pub fn needs_relayout(&self) -> bool {
        self.relayout
    }

    // --- MARK: Insertion ---
    /// Replace the selection with a single tab unit and move the caret past it.
    pub fn insert_tab(&mut self) -> Handled {
        let result = self
            .replace_selection()
            .and_then(|caret| self.insert_embeds(caret, [Embed::Tab]));
        finish("tab", result)
    }

    /// Replace the selection with a soft break, followed by one tab for each
    /// tab before the caret on its line, up to the number of stops.
    ///
    /// The caret ends up after the last inserted unit.
    pub fn insert_soft_break(&mut self) -> Handled {
        let result = self.replace_selection().and_then(|caret| {
            let before = tabs_before(self.doc, caret);
            let copies = before.min(self.stops.len());
            tracing::trace!(before, copies, "copying tabs after soft break");
            let units = iter::once(Embed::SoftBreak).chain(iter::repeat_n(Embed::Tab, copies));
            self.insert_embeds(caret, units)
        });
        finish("soft break", result)
    }

    /// Replace the selection with a block boundary. Tabs are never copied.
    pub fn hard_break(&mut self) -> Handled {
        let result = self.replace_selection().and_then(|caret| {
            self.doc.split_block(caret, ChangeSource::User)?;
            self.relayout = true;
            self.set_caret(caret + 1)
        });
        finish("hard break", result)
    }

    /// Replace the selection with plain text.
    pub fn insert_text(&mut self, text: &str) -> Handled {
        let result = self.replace_selection().and_then(|caret| {
            let inserted = self.doc.insert_text(caret, text, ChangeSource::User)?;
            self.relayout = true;
            self.set_caret(caret + inserted)
        });
        finish("text", result)
    }

    // --- MARK: Deletion ---
    /// Delete the selection or the unit before the caret, joining blocks at a
    /// block start.
    pub fn backdelete(&mut self) -> Handled {
        let selection = self.doc.selection();
        if selection.is_collapsed() {
            match selection.focus().checked_sub(1) {
                Some(start) => self.remove(start..selection.focus()),
                None => Handled::Yes,
            }
        } else {
            self.remove(selection.range())
        }
    }

    /// Delete the selection or the unit after the caret, joining blocks at a
    /// block end.
    pub fn delete(&mut self) -> Handled {
        let selection = self.doc.selection();
        if !selection.is_collapsed() {
            self.remove(selection.range())
        } else if selection.focus() < self.doc.len() {
            self.remove(selection.focus()..selection.focus() + 1)
        } else {
            Handled::Yes
        }
    }

    fn remove(&mut self, range: Range<usize>) -> Handled {
        let start = range.start;
        let result = self
            .doc
            .delete(range, ChangeSource::User)
            .and_then(|()| {
                self.relayout = true;
                self.set_caret(start)
            });
        finish("delete", result)
    }

    // --- MARK: Navigation ---
    /// Move the caret to the adjacent visual line when that line holds a tab.
    ///
    /// The caret lands on the offset of the target line whose horizontal
    /// position is closest to the current one; the earliest offset wins ties.
    /// Declines when the target line holds no tab, so that default vertical
    /// motion applies.
    pub fn move_vertical(&mut self, direction: VerticalDirection) -> Handled {
        let Ok(pos) = self.doc.resolve(self.doc.selection().focus()) else {
            return Handled::No;
        };
        let lines = self.surface.visual_lines(self.doc);
        let Some(current) = lines.iter().position(|line| line.contains(pos)) else {
            return Handled::No;
        };
        let target = match direction {
            VerticalDirection::Up => current.checked_sub(1),
            VerticalDirection::Down => Some(current + 1),
        };
        let Some(target) = target.and_then(|index| lines.get(index)) else {
            return Handled::No;
        };
        let Some(block) = self.doc.block(target.block) else {
            return Handled::No;
        };
        if block.count_embeds(target.units(), Embed::Tab) == 0 {
            return Handled::No;
        }
        let Some(x) = self.surface.caret_x(self.doc, pos) else {
            return Handled::No;
        };

        let mut best: Option<(usize, f32)> = None;
        for offset in target.caret_offsets() {
            let Some(candidate) = self
                .surface
                .caret_x(self.doc, BlockPos::new(target.block, offset))
            else {
                continue;
            };
            let distance = (candidate - x).abs();
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((offset, distance));
            }
        }
        let Some((offset, _)) = best else {
            return Handled::No;
        };
        match self
            .doc
            .offset_of(BlockPos::new(target.block, offset))
            .and_then(|caret| self.doc.set_selection(Selection::caret(caret)))
        {
            Ok(()) => Handled::Yes,
            Err(_) => Handled::No,
        }
    }

    // --- MARK: Helpers ---
    /// Delete the selected content and collapse the selection at its start.
    fn replace_selection(&mut self) -> Result<usize, Error> {
        let range = self.doc.selection().range();
        if !range.is_empty() {
            self.doc.delete(range.clone(), ChangeSource::User)?;
            self.relayout = true;
        }
        self.set_caret(range.start)
    }

    fn insert_embeds(
        &mut self,
        at: usize,
        embeds: impl IntoIterator<Item = Embed>,
    ) -> Result<usize, Error> {
        let mut caret = at;
        for embed in embeds {
            self.doc.insert_embed(caret, embed, ChangeSource::User)?;
            self.relayout = true;
            caret += 1;
        }
        self.set_caret(caret)
    }

    fn set_caret(&mut self, caret: usize) -> Result<usize, Error> {
        self.doc.set_selection(Selection::caret(caret))?;
        Ok(caret)
    }
}

fn finish(what: &'static str, result: Result<usize, Error>) -> Handled {
    match result {
        Ok(_) => Handled::Yes,
        Err(err) => {
            tracing::debug!(%err, what, "edit declined");
            Handled::No
        }
    }
}

/// Number of tabs between the start of the explicit line holding `offset` and
/// `offset` itself.
///
/// The explicit line starts at the block start or after the nearest preceding
/// soft break. An offset outside the document has no tabs before it.
pub fn tabs_before(doc: &Document, offset: usize) -> usize {
    let Ok(pos) = doc.resolve(offset) else {
        return 0;
    };
    let Some(block) = doc.block(pos.block) else {
        return 0;
    };
    let line_start = block
        .units()
        .take(pos.offset)
        .enumerate()
        .filter(|(_, unit)| matches!(unit, Unit::Embed(_, Embed::SoftBreak)))
        .last()
        .map_or(0, |(index, _)| index + 1);
    block.count_embeds(line_start..pos.offset, Embed::Tab)
}

#[cfg(test)]
mod tests {
    use super::{tabs_before, EditContext, VerticalDirection};
    use crate::editing::Handled;
    use crate::{FixedAdvance, FlowConfig, SimpleFlow, TabStop, TabStopRegistry};
    use embed_text::{Document, Embed, Selection};

    fn flow() -> SimpleFlow<FixedAdvance> {
        SimpleFlow::new(FixedAdvance::default(), FlowConfig::default())
    }

    fn stops(count: usize) -> TabStopRegistry {
        (1..=count).map(|i| TabStop::left(100.0 * i as f32)).collect()
    }

    fn doc_with_caret(text: &str, anchor: usize, focus: usize) -> Document {
        let mut doc = Document::from_plain_text(text);
        doc.set_selection(Selection::new(anchor, focus)).unwrap();
        doc
    }

    #[test]
    fn tab_replaces_selection() {
        let mut doc = doc_with_caret("abcd", 3, 1);
        let (registry, mut surface) = (stops(1), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        assert_eq!(cx.insert_tab(), Handled::Yes);
        assert!(cx.needs_relayout());
        assert_eq!(doc.to_plain_text(), "a\td");
        assert_eq!(doc.selection(), Selection::caret(2));
    }

    #[test]
    fn tabs_before_stops_at_soft_break() {
        let doc = Document::from_plain_text("\t\t\u{2028}x\tyz\t\nq\t");
        assert_eq!(tabs_before(&doc, 2), 2);
        assert_eq!(tabs_before(&doc, 3), 0);
        assert_eq!(tabs_before(&doc, 6), 1);
        assert_eq!(tabs_before(&doc, 8), 2);
        assert_eq!(tabs_before(&doc, 11), 1);
        assert_eq!(tabs_before(&doc, 99), 0);
    }

    #[test]
    fn soft_break_copies_capped_tabs() {
        let mut doc = doc_with_caret("a\tb\u{2028}\tc\td", 8, 8);
        let (registry, mut surface) = (stops(1), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        assert_eq!(cx.insert_soft_break(), Handled::Yes);
        assert_eq!(doc.to_plain_text(), "a\tb\u{2028}\tc\td\u{2028}\t");
        assert_eq!(doc.selection(), Selection::caret(10));
    }

    #[test]
    fn soft_break_mid_line_counts_tabs_before_caret() {
        let mut doc = doc_with_caret("\tx\ty", 2, 2);
        let (registry, mut surface) = (stops(3), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        cx.insert_soft_break();
        assert_eq!(doc.to_plain_text(), "\tx\u{2028}\t\ty");
        assert_eq!(doc.selection(), Selection::caret(4));
    }

    #[test]
    fn hard_break_never_copies() {
        let mut doc = doc_with_caret("\t\tx", 3, 3);
        let (registry, mut surface) = (stops(3), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        assert_eq!(cx.hard_break(), Handled::Yes);
        assert_eq!(doc.to_plain_text(), "\t\tx\n");
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.selection(), Selection::caret(4));
    }

    #[test]
    fn deletion_is_atomic_and_joins_blocks() {
        let mut doc = doc_with_caret("a\t\nb", 2, 2);
        let (registry, mut surface) = (stops(0), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        cx.backdelete();
        cx.delete();
        assert_eq!(doc.to_plain_text(), "ab");
        assert_eq!(doc.count_embeds(Embed::Tab), 0);
        assert_eq!(doc.selection(), Selection::caret(1));

        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        cx.doc.set_selection(Selection::caret(0)).unwrap();
        assert_eq!(cx.backdelete(), Handled::Yes);
        assert!(!cx.needs_relayout());
    }

    #[test]
    fn vertical_motion_picks_closest_caret() {
        // Line one carets: 0, 8, 16, then 80 after the 64px tab.
        let mut doc = doc_with_caret("ab\tcd\u{2028}xyz", 9, 9);
        let (registry, mut surface) = (stops(0), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        assert_eq!(cx.move_vertical(VerticalDirection::Up), Handled::Yes);
        assert_eq!(cx.doc.selection(), Selection::caret(2));
        assert_eq!(cx.move_vertical(VerticalDirection::Up), Handled::No);
        // The line below holds no tab.
        assert_eq!(cx.move_vertical(VerticalDirection::Down), Handled::No);
        assert!(!cx.needs_relayout());
    }

    #[test]
    fn vertical_motion_onto_tab_line() {
        let mut doc = doc_with_caret("abc\u{2028}\tx", 1, 1);
        let (registry, mut surface) = (stops(0), flow());
        let mut cx = EditContext::new(&mut doc, &registry, &mut surface);
        assert_eq!(cx.move_vertical(VerticalDirection::Down), Handled::Yes);
        assert_eq!(cx.doc.selection(), Selection::caret(4));
        assert_eq!(cx.move_vertical(VerticalDirection::Up), Handled::No);
    }
}
