// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{Embed, EmbedId, TextFormat};

/// A maximal piece of a block with uniform content kind and format.
#[derive(Clone, Debug, PartialEq)]
pub enum Run {
    /// Formatted text. Never empty inside a [`Block`].
    Text {
        /// The text content.
        text: String,
        /// Font attributes of the text.
        format: TextFormat,
    },
    /// An atomic embed.
    Embed {
        /// Identity of the embed within its document.
        id: EmbedId,
        /// The kind of embed.
        embed: Embed,
        /// Font context the embed is rendered in.
        format: TextFormat,
    },
}

impl Run {
    /// Number of offsets this run occupies.
    pub fn len(&self) -> usize {
        match self {
            Self::Text { text, .. } => text.chars().count(),
            Self::Embed { .. } => 1,
        }
    }

    /// Returns `true` for an empty text run.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text { text, .. } if text.is_empty())
    }

    /// Font attributes of this run.
    pub fn format(&self) -> &TextFormat {
        match self {
            Self::Text { format, .. } | Self::Embed { format, .. } => format,
        }
    }

    /// The text content, if this is a text run.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Embed { .. } => None,
        }
    }

    /// The embed kind, if this is an embed run.
    pub fn embed(&self) -> Option<Embed> {
        match self {
            Self::Embed { embed, .. } => Some(*embed),
            Self::Text { .. } => None,
        }
    }

    /// The embed identity, if this is an embed run.
    pub fn embed_id(&self) -> Option<EmbedId> {
        match self {
            Self::Embed { id, .. } => Some(*id),
            Self::Text { .. } => None,
        }
    }

    /// Returns `true` if this is an embed of the given kind.
    pub fn is_embed(&self, kind: Embed) -> bool {
        self.embed() == Some(kind)
    }
}

/// The content at a single offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    /// A text character.
    Char(char),
    /// An embed.
    Embed(EmbedId, Embed),
}

/// A logical block (paragraph) of runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    runs: Vec<Run>,
}

impl Block {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// The runs of this block in order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of offsets in this block, not counting its trailing boundary.
    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }

    /// Returns `true` if the block has no content.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The offset at which run `run` starts. `run == runs().len()` yields the block length.
    pub fn run_start(&self, run: usize) -> Option<usize> {
        if run > self.runs.len() {
            return None;
        }
        Some(self.runs[..run].iter().map(Run::len).sum())
    }

    /// The run holding the unit at `offset`, with the offset relative to that run.
    pub fn run_at(&self, offset: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (index, run) in self.runs.iter().enumerate() {
            let len = run.len();
            if offset < start + len {
                return Some((index, offset - start));
            }
            start += len;
        }
        None
    }

    /// The unit at `offset`.
    pub fn unit_at(&self, offset: usize) -> Option<Unit> {
        let (index, inner) = self.run_at(offset)?;
        match &self.runs[index] {
            Run::Text { text, .. } => text.chars().nth(inner).map(Unit::Char),
            Run::Embed { id, embed, .. } => Some(Unit::Embed(*id, *embed)),
        }
    }

    /// Iterate over all units of the block in order.
    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        self.runs.iter().flat_map(|run| {
            let (text, embed) = match run {
                Run::Text { text, .. } => (text.as_str(), None),
                Run::Embed { id, embed, .. } => ("", Some(Unit::Embed(*id, *embed))),
            };
            text.chars().map(Unit::Char).chain(embed)
        })
    }

    /// Number of embeds of the given kind in `range`.
    pub fn count_embeds(&self, range: Range<usize>, kind: Embed) -> usize {
        self.units()
            .enumerate()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .filter(|(_, unit)| matches!(unit, Unit::Embed(_, e) if *e == kind))
            .count()
    }

    /// Returns `true` if any run is an embed of the given kind.
    pub fn contains_embed(&self, kind: Embed) -> bool {
        self.runs.iter().any(|run| run.is_embed(kind))
    }

    /// The format in effect at `offset`: that of the unit before it, or else the unit at it.
    pub fn format_at(&self, offset: usize) -> Option<&TextFormat> {
        offset
            .checked_sub(1)
            .and_then(|before| self.run_at(before))
            .or_else(|| self.run_at(offset))
            .map(|(index, _)| self.runs[index].format())
    }

    pub(crate) fn insert_text(&mut self, offset: usize, text: &str, format: TextFormat) {
        if text.is_empty() {
            return;
        }
        let index = self.split_at(offset);
        self.runs.insert(
            index,
            Run::Text {
                text: text.into(),
                format,
            },
        );
        self.normalize();
    }

    pub(crate) fn insert_embed(
        &mut self,
        offset: usize,
        id: EmbedId,
        embed: Embed,
        format: TextFormat,
    ) {
        let index = self.split_at(offset);
        self.runs.insert(index, Run::Embed { id, embed, format });
    }

    pub(crate) fn delete(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start = self.split_at(range.start);
        let end = self.split_at(range.end);
        self.runs.drain(start..end);
        self.normalize();
    }

    /// Split the block at `offset`, keeping the head and returning the tail.
    pub(crate) fn split_off(&mut self, offset: usize) -> Self {
        let index = self.split_at(offset);
        let mut tail = Self {
            runs: self.runs.split_off(index),
        };
        self.normalize();
        tail.normalize();
        tail
    }

    pub(crate) fn append(&mut self, other: Self) {
        self.runs.extend(other.runs);
        self.normalize();
    }

    pub(crate) fn push_run(&mut self, run: Run) {
        if !run.is_empty() {
            self.runs.push(run);
            self.normalize();
        }
    }

    /// Ensure a run boundary at `offset` and return the index of the run starting there.
    ///
    /// `offset` must not exceed the block length.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            if start == offset {
                return index;
            }
            let len = self.runs[index].len();
            if offset < start + len {
                // Embeds have length 1, so only text runs contain an inner boundary.
                let Run::Text { text, format } = &mut self.runs[index] else {
                    return index;
                };
                let at = byte_index(text, offset - start);
                let tail = Run::Text {
                    text: text.split_off(at),
                    format: format.clone(),
                };
                self.runs.insert(index + 1, tail);
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    fn normalize(&mut self) {
        self.runs.retain(|run| !run.is_empty());
        let mut index = 1;
        while index < self.runs.len() {
            let mergeable = matches!(
                (&self.runs[index - 1], &self.runs[index]),
                (Run::Text { format: a, .. }, Run::Text { format: b, .. }) if a == b
            );
            if !mergeable {
                index += 1;
                continue;
            }
            if let Run::Text { text: next, .. } = self.runs.remove(index) {
                if let Run::Text { text, .. } = &mut self.runs[index - 1] {
                    text.push_str(&next);
                }
            }
        }
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}
