// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reference [`LayoutSurface`]: greedy line layout over a [`TextMeasurer`].

use embed_text::{Block, BlockPos, Document, DocumentId, Embed, EmbedId, Run, TextFormat};
use hashbrown::HashMap;

use crate::surface::{LineEnd, Point, VisualLine};
use crate::{EmbedBox, LayoutSurface, MeasureCache, TabLayoutConfig, TabPlacement, TextMeasurer};

/// Settings of a [`SimpleFlow`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FlowConfig {
    /// Width available to each line; `None` disables wrapping.
    pub width: Option<f32>,
    /// Line height as a multiple of the largest font size in a block.
    pub line_height_factor: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            width: None,
            line_height_factor: 1.25,
        }
    }
}

#[derive(Debug)]
struct BlockFlow {
    line_height: f32,
    /// Top-left of each run's first fragment.
    origins: Vec<Point>,
    /// Caret x for every offset `0..=len`.
    carets: Vec<f32>,
    lines: Vec<VisualLine>,
}

/// Per-block layouts of one state of one document.
#[derive(Debug)]
struct FlowCache {
    doc: DocumentId,
    revision: u64,
    /// `None` for blocks that need to be laid out again.
    blocks: Vec<Option<BlockFlow>>,
    /// Block holding each tab that was laid out.
    tab_blocks: HashMap<EmbedId, usize>,
}

/// Lays out a document line by line, breaking after whitespace.
///
/// Tabs are drawn with the width last written through
/// [`set_tab_placement`](LayoutSurface::set_tab_placement), or the width of
/// the fallback reference run if none was written yet. Like whitespace, a tab
/// never moves to the next line by itself; the content after it does.
///
/// Layout is computed lazily per block. An edit, a document swap, or a width
/// change drops every block; a new tab placement drops only the tab's block.
#[derive(Debug)]
pub struct SimpleFlow<M> {
    measurer: M,
    cache: MeasureCache,
    config: FlowConfig,
    placements: HashMap<EmbedId, TabPlacement>,
    fallback_sample: String,
    attached: bool,
    layout: Option<FlowCache>,
}

impl<M: TextMeasurer> SimpleFlow<M> {
    /// Create an attached surface.
    pub fn new(measurer: M, config: FlowConfig) -> Self {
        Self {
            measurer,
            cache: MeasureCache::default(),
            config,
            placements: HashMap::new(),
            fallback_sample: TabLayoutConfig::default().fallback_sample(),
            attached: true,
            layout: None,
        }
    }

    /// The settings in use.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Change the available width, as on a viewport resize.
    pub fn set_width(&mut self, width: Option<f32>) {
        if self.config.width != width {
            self.config.width = width;
            self.layout = None;
        }
    }

    /// Detach the surface: geometry and measurement queries return `None`
    /// until [`attach`](Self::attach) is called.
    pub fn detach(&mut self) {
        self.attached = false;
        self.layout = None;
    }

    /// Re-attach a detached surface.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Returns `true` unless detached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Borrow the measurer.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Widths measured while laying out lines.
    pub fn cache(&self) -> &MeasureCache {
        &self.cache
    }

    fn block(&mut self, doc: &Document, index: usize) -> Option<&BlockFlow> {
        if !self.attached {
            return None;
        }
        let stale = self
            .layout
            .as_ref()
            .is_none_or(|layout| layout.doc != doc.id() || layout.revision != doc.revision());
        if stale {
            self.layout = Some(FlowCache {
                doc: doc.id(),
                revision: doc.revision(),
                blocks: doc.blocks().iter().map(|_| None).collect(),
                tab_blocks: HashMap::new(),
            });
        }
        let block = doc.block(index)?;
        let layout = self.layout.as_mut()?;
        let slot = layout.blocks.get_mut(index)?;
        if slot.is_none() {
            let mut measure = |text: &str, format: &TextFormat| {
                self.cache
                    .measure(text, format, &mut self.measurer)
                    .unwrap_or(0.0)
            };
            *slot = Some(flow_block(
                &mut measure,
                &self.config,
                &self.placements,
                &self.fallback_sample,
                index,
                block,
            ));
            for run in block.runs() {
                if run.is_embed(Embed::Tab) {
                    if let Some(id) = run.embed_id() {
                        layout.tab_blocks.insert(id, index);
                    }
                }
            }
        }
        slot.as_ref()
    }
}

impl<M: TextMeasurer> TextMeasurer for SimpleFlow<M> {
    fn measure_text(&mut self, text: &str, format: &TextFormat) -> Option<f32> {
        if !self.attached {
            return None;
        }
        self.measurer.measure_text(text, format)
    }
}

impl<M: TextMeasurer> LayoutSurface for SimpleFlow<M> {
    fn run_origin(&mut self, doc: &Document, block: usize, run: usize) -> Option<Point> {
        self.block(doc, block)?.origins.get(run).copied()
    }

    fn line_height(&mut self, doc: &Document, block: usize) -> Option<f32> {
        self.block(doc, block).map(|b| b.line_height)
    }

    fn set_tab_placement(&mut self, id: EmbedId, placement: TabPlacement) {
        if self.placements.insert(id, placement) == Some(placement) {
            return;
        }
        if let Some(layout) = &mut self.layout {
            if let Some(&index) = layout.tab_blocks.get(&id) {
                if let Some(slot) = layout.blocks.get_mut(index) {
                    *slot = None;
                }
            }
        }
    }

    fn tab_placement(&self, id: EmbedId) -> Option<TabPlacement> {
        self.placements.get(&id).copied()
    }

    fn retain_placements(&mut self, keep: &mut dyn FnMut(EmbedId) -> bool) {
        self.placements.retain(|id, _| keep(*id));
    }

    fn visual_lines(&mut self, doc: &Document) -> Vec<VisualLine> {
        let mut lines = Vec::new();
        for index in 0..doc.blocks().len() {
            match self.block(doc, index) {
                Some(block) => lines.extend(block.lines.iter().cloned()),
                None => return Vec::new(),
            }
        }
        lines
    }

    fn caret_x(&mut self, doc: &Document, pos: BlockPos) -> Option<f32> {
        self.block(doc, pos.block)?.carets.get(pos.offset).copied()
    }
}

fn flow_block(
    measure: &mut impl FnMut(&str, &TextFormat) -> f32,
    config: &FlowConfig,
    placements: &HashMap<EmbedId, TabPlacement>,
    fallback_sample: &str,
    index: usize,
    block: &Block,
) -> BlockFlow {
    let font_size = block
        .runs()
        .iter()
        .map(|run| run.format().size)
        .fold(None, |max: Option<f32>, size| Some(max.map_or(size, |m| m.max(size))))
        .unwrap_or(TextFormat::default().size);
    let line_height = font_size * config.line_height_factor;

    let mut origins = Vec::with_capacity(block.runs().len());
    let mut carets = vec![0.0; block.len() + 1];
    let mut lines = Vec::new();
    let (mut x, mut y) = (0.0_f32, 0.0_f32);
    let mut line_start = 0;
    let mut offset = 0;
    let mut buf = [0; 4];

    for run in block.runs() {
        match run {
            Run::Text { text, format } => {
                let mut first = true;
                for piece in pieces(text) {
                    let visible = measure(piece.trim_end_matches(is_breaking_space), format);
                    if x > 0.0 && config.width.is_some_and(|max| x + visible > max) {
                        lines.push(VisualLine {
                            block: index,
                            start: line_start,
                            end: offset,
                            ends_with: LineEnd::Wrap,
                        });
                        line_start = offset;
                        x = 0.0;
                        y += line_height;
                    }
                    if first {
                        origins.push(Point::new(x, y));
                        first = false;
                    }
                    for ch in piece.chars() {
                        carets[offset] = x;
                        x += measure(&*ch.encode_utf8(&mut buf), format);
                        offset += 1;
                    }
                }
            }
            Run::Embed { id, embed, format } => {
                origins.push(Point::new(x, y));
                carets[offset] = x;
                let fallback = measure(fallback_sample, format);
                match EmbedBox::for_embed(*embed, placements.get(id).copied(), fallback) {
                    EmbedBox::Space(width) => x += width,
                    EmbedBox::Glyph(ch) => x += measure(&*ch.encode_utf8(&mut buf), format),
                    EmbedBox::LineBreak => {
                        lines.push(VisualLine {
                            block: index,
                            start: line_start,
                            end: offset,
                            ends_with: LineEnd::SoftBreak,
                        });
                        line_start = offset + 1;
                        x = 0.0;
                        y += line_height;
                    }
                }
                offset += 1;
            }
        }
    }
    carets[offset] = x;
    lines.push(VisualLine {
        block: index,
        start: line_start,
        end: offset,
        ends_with: LineEnd::BlockEnd,
    });

    BlockFlow {
        line_height,
        origins,
        carets,
        lines,
    }
}

fn is_breaking_space(ch: char) -> bool {
    ch.is_whitespace() && ch != '\u{a0}'
}

/// Split text after each run of breaking whitespace: `"ab  cd e"` yields
/// `"ab  "`, `"cd "`, `"e"`.
fn pieces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev_space = false;
    for (index, ch) in text.char_indices() {
        let space = is_breaking_space(ch);
        if prev_space && !space {
            pieces.push(&text[start..index]);
            start = index;
        }
        prev_space = space;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
