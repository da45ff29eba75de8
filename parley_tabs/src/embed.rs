// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering contracts for the atomic embeds.

use embed_text::Embed;

/// How the visual line holding a tab began.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TabLine {
    /// The tab is on the first visual line of its block.
    #[default]
    FirstLine,
    /// The tab's line starts after a soft break.
    ExplicitBreak,
    /// The tab's line was produced by automatic wrapping.
    Wrapped,
}

impl TabLine {
    /// Whether tab stops apply on this line.
    pub const fn uses_stops(self) -> bool {
        !matches!(self, Self::Wrapped)
    }
}

/// The layout of one tab, written by the engine every pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TabPlacement {
    /// Rendered width in pixels.
    pub width: f32,
    /// Classification of the tab's visual line.
    pub line: TabLine,
    /// Set on the first tab of each wrapped visual line, for optional highlighting.
    pub wrap_start: bool,
}

impl TabPlacement {
    /// A placement on a first line with the given width.
    pub const fn with_width(width: f32) -> Self {
        Self {
            width,
            line: TabLine::FirstLine,
            wrap_start: false,
        }
    }
}

/// What a renderer draws for an embed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EmbedBox {
    /// Blank space of a given width. Never a line break opportunity.
    Space(f32),
    /// A glyph measured in the embed's font. Never a line break opportunity.
    Glyph(char),
    /// An unconditional line break.
    LineBreak,
}

impl EmbedBox {
    /// The box for `embed`. Tabs use `placement` when one has been computed and
    /// `fallback_width` otherwise.
    pub fn for_embed(embed: Embed, placement: Option<TabPlacement>, fallback_width: f32) -> Self {
        match embed {
            Embed::Tab => Self::Space(placement.map_or(fallback_width, |p| p.width)),
            Embed::SoftBreak => Self::LineBreak,
            Embed::Nbsp => Self::Glyph(Embed::Nbsp.as_char()),
        }
    }
}
