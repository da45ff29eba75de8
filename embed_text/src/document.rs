// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document: blocks of runs addressed by linear offsets.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::block::{Block, Run};
use crate::{Embed, EmbedId, Error, Selection, TextFormat};

/// A position expressed as a block index and an offset within that block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockPos {
    /// Index of the block.
    pub block: usize,
    /// Offset within the block, `0..=block.len()`.
    pub offset: usize,
}

impl BlockPos {
    /// Create a block position.
    pub const fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Who caused a [`Change`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeSource {
    /// An edit made in response to user input.
    User,
    /// A programmatic edit.
    Api,
}

/// Describes one mutation of a [`Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Linear offset at which the change happened.
    pub at: usize,
    /// Number of units removed at `at`.
    pub removed: usize,
    /// Number of units inserted at `at`.
    pub inserted: usize,
    /// Who caused the change.
    pub source: ChangeSource,
}

/// Identity of a [`Document`] instance.
///
/// Unique among all documents created in the process, including clones, so a
/// document's [id](Document::id) and [revision](Document::revision) together
/// name one state of one document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(usize);

impl DocumentId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle to an embed found in a document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmbedRef {
    /// Index of the block holding the embed.
    pub block: usize,
    /// Index of the embed's run within the block.
    pub run: usize,
    /// Offset of the embed within the block.
    pub offset: usize,
    /// Identity of the embed.
    pub id: EmbedId,
    /// Kind of embed.
    pub embed: Embed,
}

/// A run-based rich text document.
///
/// A document always has at least one (possibly empty) block. Every mutation
/// bumps the [revision](Self::revision), records a [`Change`] that can be
/// collected with [`drain_changes`](Self::drain_changes), and keeps the
/// selection pointing at the same content.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    blocks: Vec<Block>,
    selection: Selection,
    default_format: TextFormat,
    next_id: u64,
    revision: u64,
    changes: Vec<Change>,
}

impl Clone for Document {
    /// The clone gets a fresh [`DocumentId`].
    fn clone(&self) -> Self {
        Self {
            id: DocumentId::next(),
            blocks: self.blocks.clone(),
            selection: self.selection,
            default_format: self.default_format.clone(),
            next_id: self.next_id,
            revision: self.revision,
            changes: self.changes.clone(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with a single empty block.
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            blocks: alloc::vec![Block::new()],
            selection: Selection::default(),
            default_format: TextFormat::default(),
            next_id: 0,
            revision: 0,
            changes: Vec::new(),
        }
    }

    /// Create a document from plain text, mapping embed characters to embeds.
    pub fn from_plain_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.insert_at(BlockPos::default(), text);
        doc.changes.clear();
        doc
    }

    /// Returns this document with a different format for text typed into empty blocks.
    #[must_use]
    pub fn with_default_format(mut self, format: TextFormat) -> Self {
        self.default_format = format;
        self
    }

    /// The plain text form of the document.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            for run in block.runs() {
                match run {
                    Run::Text { text, .. } => out.push_str(text),
                    Run::Embed { embed, .. } => out.push(embed.as_char()),
                }
            }
        }
        out
    }

    /// The blocks of the document.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The block at `index`.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Total length in linear offsets, including block boundaries.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Block::len).sum::<usize>() + self.blocks.len() - 1
    }

    /// Returns `true` if the document holds a single empty block.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of this document instance.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// A counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The linear offset at which `block` starts.
    pub fn block_start(&self, block: usize) -> Result<usize, Error> {
        if block >= self.blocks.len() {
            return Err(Error::no_such_block(block, self.blocks.len()));
        }
        Ok(self.blocks[..block].iter().map(|b| b.len() + 1).sum())
    }

    /// Convert a linear offset to a block position.
    pub fn resolve(&self, offset: usize) -> Result<BlockPos, Error> {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            let end = start + block.len();
            if offset <= end {
                return Ok(BlockPos::new(index, offset - start));
            }
            start = end + 1;
        }
        Err(Error::out_of_bounds(offset, offset, self.len()))
    }

    /// Convert a block position to a linear offset.
    pub fn offset_of(&self, pos: BlockPos) -> Result<usize, Error> {
        let start = self.block_start(pos.block)?;
        let len = self.blocks[pos.block].len();
        if pos.offset > len {
            return Err(Error::out_of_bounds(pos.offset, pos.offset, len));
        }
        Ok(start + pos.offset)
    }

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Replace the selection.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), Error> {
        let len = self.len();
        if selection.anchor() > len || selection.focus() > len {
            return Err(Error::out_of_bounds(
                selection.anchor(),
                selection.focus(),
                len,
            ));
        }
        self.selection = selection;
        Ok(())
    }

    /// The font attributes in effect at `offset`.
    ///
    /// This is the format of the unit before `offset` within its block, or of
    /// the unit after it, or the document default for empty blocks.
    pub fn format_at(&self, offset: usize) -> &TextFormat {
        self.resolve(offset)
            .ok()
            .and_then(|pos| self.blocks[pos.block].format_at(pos.offset))
            .unwrap_or(&self.default_format)
    }

    /// Insert plain text at `offset`, mapping embed characters to embeds and
    /// `\n` to block boundaries. Returns the number of units inserted.
    pub fn insert_text(
        &mut self,
        offset: usize,
        text: &str,
        source: ChangeSource,
    ) -> Result<usize, Error> {
        let pos = self.resolve(offset)?;
        let end = self.insert_at(pos, text);
        let inserted = self.offset_of(end)? - offset;
        self.record(offset, 0, inserted, source);
        Ok(inserted)
    }

    /// Insert a single embed at `offset`.
    pub fn insert_embed(
        &mut self,
        offset: usize,
        embed: Embed,
        source: ChangeSource,
    ) -> Result<EmbedId, Error> {
        let pos = self.resolve(offset)?;
        let format = self.format_at(offset).clone();
        let id = self.next_id();
        self.blocks[pos.block].insert_embed(pos.offset, id, embed, format);
        self.record(offset, 0, 1, source);
        Ok(id)
    }

    /// Split the block containing `offset`, starting a new block there.
    pub fn split_block(&mut self, offset: usize, source: ChangeSource) -> Result<(), Error> {
        let pos = self.resolve(offset)?;
        let tail = self.blocks[pos.block].split_off(pos.offset);
        self.blocks.insert(pos.block + 1, tail);
        self.record(offset, 0, 1, source);
        Ok(())
    }

    /// Remove `range`, joining blocks if it spans block boundaries.
    pub fn delete(&mut self, range: Range<usize>, source: ChangeSource) -> Result<(), Error> {
        let len = self.len();
        if range.start > range.end {
            return Err(Error::invalid_range(range.start, range.end, len));
        }
        if range.end > len {
            return Err(Error::out_of_bounds(range.start, range.end, len));
        }
        if range.is_empty() {
            return Ok(());
        }
        let start = self.resolve(range.start)?;
        let end = self.resolve(range.end)?;
        if start.block == end.block {
            self.blocks[start.block].delete(start.offset..end.offset);
        } else {
            let tail = self.blocks[end.block].split_off(end.offset);
            let head = &mut self.blocks[start.block];
            head.delete(start.offset..head.len());
            self.blocks.drain(start.block + 1..=end.block);
            self.blocks[start.block].append(tail);
        }
        self.record(range.start, range.len(), 0, source);
        Ok(())
    }

    /// Iterate over every embed in document order.
    pub fn embeds(&self) -> impl Iterator<Item = EmbedRef> + '_ {
        self.blocks.iter().enumerate().flat_map(|(block, b)| {
            let mut offset = 0;
            b.runs().iter().enumerate().filter_map(move |(run, r)| {
                let at = offset;
                offset += r.len();
                match r {
                    Run::Embed { id, embed, .. } => Some(EmbedRef {
                        block,
                        run,
                        offset: at,
                        id: *id,
                        embed: *embed,
                    }),
                    Run::Text { .. } => None,
                }
            })
        })
    }

    /// Number of embeds of the given kind in the whole document.
    pub fn count_embeds(&self, kind: Embed) -> usize {
        self.embeds().filter(|e| e.embed == kind).count()
    }

    /// Returns `true` if changes were recorded since the last drain.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Take the changes recorded since the last drain.
    pub fn drain_changes(&mut self) -> alloc::vec::Drain<'_, Change> {
        self.changes.drain(..)
    }

    fn next_id(&mut self) -> EmbedId {
        let id = EmbedId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&mut self, at: usize, removed: usize, inserted: usize, source: ChangeSource) {
        let mut selection = self.selection;
        if removed > 0 {
            selection = selection.map_delete(at..at + removed);
        }
        if inserted > 0 {
            selection = selection.map_insert(at, inserted);
        }
        self.selection = selection;
        self.revision += 1;
        self.changes.push(Change {
            at,
            removed,
            inserted,
            source,
        });
    }

    /// Insert `text` at a valid position and return the position after it.
    fn insert_at(&mut self, mut pos: BlockPos, text: &str) -> BlockPos {
        let format = self.blocks[pos.block]
            .format_at(pos.offset)
            .unwrap_or(&self.default_format)
            .clone();
        let mut pending = String::new();
        for ch in text.chars() {
            let embed = Embed::from_char(ch);
            if embed.is_none() && ch != '\n' {
                pending.push(ch);
                continue;
            }
            pos = self.flush_text(pos, &mut pending, &format);
            if let Some(embed) = embed {
                let id = self.next_id();
                self.blocks[pos.block].insert_embed(pos.offset, id, embed, format.clone());
                pos.offset += 1;
            } else {
                let tail = self.blocks[pos.block].split_off(pos.offset);
                self.blocks.insert(pos.block + 1, tail);
                pos = BlockPos::new(pos.block + 1, 0);
            }
        }
        self.flush_text(pos, &mut pending, &format)
    }

    fn flush_text(&mut self, pos: BlockPos, pending: &mut String, format: &TextFormat) -> BlockPos {
        if pending.is_empty() {
            return pos;
        }
        let len = pending.chars().count();
        self.blocks[pos.block].insert_text(pos.offset, pending, format.clone());
        pending.clear();
        BlockPos::new(pos.block, pos.offset + len)
    }
}

/// A serialized run.
///
/// Embeds carry only their presence; widths and identities are never stored.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoredRun {
    /// Formatted text.
    Text {
        /// The text content.
        text: String,
        /// Font attributes of the text.
        #[serde(default)]
        format: TextFormat,
    },
    /// A tab.
    Tab,
    /// A soft line break.
    SoftBreak,
    /// A non-breaking space.
    Nbsp,
}

#[cfg(feature = "serde")]
impl Document {
    /// The serialized form: one list of runs per block.
    pub fn to_stored(&self) -> Vec<Vec<StoredRun>> {
        self.blocks
            .iter()
            .map(|block| {
                block
                    .runs()
                    .iter()
                    .map(|run| match run {
                        Run::Text { text, format } => StoredRun::Text {
                            text: text.clone(),
                            format: format.clone(),
                        },
                        Run::Embed { embed, .. } => match embed {
                            Embed::Tab => StoredRun::Tab,
                            Embed::SoftBreak => StoredRun::SoftBreak,
                            Embed::Nbsp => StoredRun::Nbsp,
                        },
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuild a document from its serialized form, assigning fresh embed ids.
    ///
    /// Embeds take the format of the run before them.
    pub fn from_stored(blocks: Vec<Vec<StoredRun>>) -> Self {
        let mut doc = Self::new();
        doc.blocks.clear();
        for stored in blocks {
            let mut block = Block::new();
            let mut format = doc.default_format.clone();
            for run in stored {
                let embed = match run {
                    StoredRun::Text { text, format: f } => {
                        format = f.clone();
                        block.push_run(Run::Text { text, format: f });
                        continue;
                    }
                    StoredRun::Tab => Embed::Tab,
                    StoredRun::SoftBreak => Embed::SoftBreak,
                    StoredRun::Nbsp => Embed::Nbsp,
                };
                let id = doc.next_id();
                block.push_run(Run::Embed {
                    id,
                    embed,
                    format: format.clone(),
                });
            }
            doc.blocks.push(block);
        }
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::new());
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockPos, ChangeSource, Document};
    use crate::{Embed, ErrorKind, Selection};
    use alloc::vec::Vec;

    #[test]
    fn plain_text_round_trip() {
        let text = "a\tb\u{2028}\u{a0}c\n\nlast";
        let doc = Document::from_plain_text(text);
        assert_eq!(doc.blocks().len(), 3);
        assert_eq!(doc.to_plain_text(), text);
        assert_eq!(doc.len(), text.chars().count());
        assert!(!doc.has_changes());
    }

    #[test]
    fn resolve_and_offset_of_agree() {
        let doc = Document::from_plain_text("ab\ncde\n");
        assert_eq!(doc.resolve(2).unwrap(), BlockPos::new(0, 2));
        assert_eq!(doc.resolve(3).unwrap(), BlockPos::new(1, 0));
        assert_eq!(doc.resolve(7).unwrap(), BlockPos::new(2, 0));
        for offset in 0..=doc.len() {
            let pos = doc.resolve(offset).unwrap();
            assert_eq!(doc.offset_of(pos).unwrap(), offset);
        }
        assert_eq!(doc.resolve(8).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn embed_ids_are_unique_and_ordered() {
        let mut doc = Document::from_plain_text("\t\t");
        let id = doc.insert_embed(1, Embed::Tab, ChangeSource::User).unwrap();
        let ids: Vec<_> = doc.embeds().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[1], id);
        assert!(ids[0] < ids[2]);
        assert!(ids[2] < ids[1]);
    }

    #[test]
    fn delete_across_blocks_joins_them() {
        let mut doc = Document::from_plain_text("abc\ndef\nghi");
        doc.delete(2..9, ChangeSource::Api).unwrap();
        assert_eq!(doc.to_plain_text(), "abhi");
        assert_eq!(doc.blocks().len(), 1);
    }

    #[test]
    fn changes_track_source_and_move_selection() {
        let mut doc = Document::from_plain_text("abc");
        doc.set_selection(Selection::caret(3)).unwrap();
        doc.insert_text(0, "xy", ChangeSource::Api).unwrap();
        doc.split_block(1, ChangeSource::User).unwrap();
        assert_eq!(doc.selection(), Selection::caret(6));
        let changes: Vec<_> = doc.drain_changes().collect();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].source, ChangeSource::Api);
        assert_eq!(changes[0].inserted, 2);
        assert_eq!(changes[1].source, ChangeSource::User);
        assert!(!doc.has_changes());
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn every_instance_has_its_own_id() {
        let doc = Document::from_plain_text("a\tb");
        let other = Document::from_plain_text("a\tb");
        assert_eq!(doc.revision(), other.revision());
        assert_ne!(doc.id(), other.id());
        let copy = doc.clone();
        assert_ne!(copy.id(), doc.id());
        assert_eq!(copy.to_plain_text(), doc.to_plain_text());
    }

    #[test]
    fn selection_out_of_bounds_is_rejected() {
        let mut doc = Document::from_plain_text("abc");
        assert!(doc.set_selection(Selection::new(1, 4)).is_err());
        assert_eq!(doc.selection(), Selection::caret(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn stored_form_keeps_only_presence() {
        let doc = Document::from_plain_text("a\tb\u{2028}\tc");
        let json = serde_json::to_string(&doc.to_stored()).unwrap();
        assert!(json.contains(r#"{"type":"tab"}"#));
        assert!(json.contains(r#"{"type":"soft_break"}"#));
        assert!(!json.contains("width"));
        let back = Document::from_stored(serde_json::from_str(&json).unwrap());
        assert_eq!(back.to_plain_text(), doc.to_plain_text());
        assert_eq!(back.count_embeds(Embed::Tab), 2);
    }
}
