// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// An atomic, non-text unit in a [`Document`](crate::Document).
///
/// Embeds occupy exactly one offset and cannot be split or partially selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Embed {
    /// Whitespace advancing to the next tab stop. Its rendered width is derived
    /// from the surrounding layout and is never stored in the document.
    Tab,
    /// An unconditional line break that stays within the current block.
    SoftBreak,
    /// A non-breaking space.
    Nbsp,
}

impl Embed {
    /// The character this embed maps to in plain text.
    pub const fn as_char(self) -> char {
        match self {
            Self::Tab => '\t',
            Self::SoftBreak => '\u{2028}',
            Self::Nbsp => '\u{a0}',
        }
    }

    /// The embed a plain text character maps to, if any.
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\t' => Some(Self::Tab),
            '\u{2028}' => Some(Self::SoftBreak),
            '\u{a0}' => Some(Self::Nbsp),
            _ => None,
        }
    }

    /// Whether this embed ends the visual line it is on.
    pub const fn breaks_line(self) -> bool {
        matches!(self, Self::SoftBreak)
    }
}

/// Stable identity of an embed within one document.
///
/// Ids are assigned in increasing order and never reused by the document that
/// created them. They are not persisted; loading a document assigns fresh ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmbedId(pub(crate) u64);

impl EmbedId {
    /// The raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}
