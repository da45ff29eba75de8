// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tab layout engine.

use embed_text::{Document, Embed, EmbedId, Run, TextFormat};
use hashbrown::HashSet;

use crate::surface::Point;
use crate::{
    LayoutSurface, MeasureCache, TabAlignment, TabLayoutConfig, TabLine, TabPlacement,
    TabStopRegistry,
};

/// One tab to lay out, in document order.
#[derive(Copy, Clone, Debug)]
struct TabHandle {
    block: usize,
    run: usize,
    id: EmbedId,
}

/// Summary of the most recent [`TabLayoutEngine::recompute_layout`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Tabs that received a width.
    pub tabs: usize,
    /// Tabs that were bound to a stop.
    pub stopped: usize,
    /// Tabs that received the fallback width.
    pub fallbacks: usize,
    /// Tabs on automatically wrapped lines.
    pub wrapped: usize,
}

/// Computes the rendered width of every tab in a document.
///
/// Each pass walks the tabs in document order and, for each one, reads its
/// position from the surface, classifies its visual line, picks a stop, and
/// writes the resulting [`TabPlacement`] back to the surface before moving on.
/// Later tabs see the widths written for earlier ones, so the pass is strictly
/// sequential.
#[derive(Debug)]
pub struct TabLayoutEngine {
    config: TabLayoutConfig,
    fallback_sample: String,
    cache: MeasureCache,
    last_pass: PassSummary,
}

impl Default for TabLayoutEngine {
    fn default() -> Self {
        Self::new(TabLayoutConfig::default())
    }
}

impl TabLayoutEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: TabLayoutConfig) -> Self {
        Self {
            fallback_sample: config.fallback_sample(),
            cache: MeasureCache::new(config.cache_capacity),
            config,
            last_pass: PassSummary::default(),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &TabLayoutConfig {
        &self.config
    }

    /// The measurement cache.
    pub fn cache(&self) -> &MeasureCache {
        &self.cache
    }

    /// Drop all cached measurements.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Summary of the most recent pass.
    pub fn last_pass(&self) -> PassSummary {
        self.last_pass
    }

    /// Recompute and write the placement of every tab in `doc`.
    ///
    /// Idempotent: a second call without intervening changes writes the same
    /// placements. Never fails; a tab whose geometry cannot be measured gets
    /// the fallback width.
    pub fn recompute_layout(
        &mut self,
        doc: &Document,
        stops: &TabStopRegistry,
        surface: &mut impl LayoutSurface,
    ) {
        let tabs: Vec<TabHandle> = doc
            .embeds()
            .filter(|e| e.embed == Embed::Tab)
            .map(|e| TabHandle {
                block: e.block,
                run: e.run,
                id: e.id,
            })
            .collect();

        let mut summary = PassSummary::default();
        // Top of the last wrapped line that was tagged, per block.
        let mut tagged: Option<(usize, f32)> = None;
        for tab in &tabs {
            let placement = self.place_tab(doc, stops, surface, *tab, &mut tagged, &mut summary);
            surface.set_tab_placement(tab.id, placement);
            summary.tabs += 1;
        }

        let live: HashSet<EmbedId> = tabs.iter().map(|tab| tab.id).collect();
        surface.retain_placements(&mut |id| live.contains(&id));
        self.last_pass = summary;
        tracing::debug!(
            tabs = summary.tabs,
            stopped = summary.stopped,
            fallbacks = summary.fallbacks,
            wrapped = summary.wrapped,
            stops = stops.len(),
            "recomputed tab layout"
        );
    }

    fn place_tab(
        &mut self,
        doc: &Document,
        stops: &TabStopRegistry,
        surface: &mut impl LayoutSurface,
        tab: TabHandle,
        tagged: &mut Option<(usize, f32)>,
        summary: &mut PassSummary,
    ) -> TabPlacement {
        let runs = doc.blocks()[tab.block].runs();
        let format = runs[tab.run].format();

        let origin = surface
            .run_origin(doc, tab.block, tab.run)
            .filter(|p| p.is_finite());
        let line_height = surface
            .line_height(doc, tab.block)
            .filter(|h| h.is_finite() && *h > 0.0);
        let (Some(origin), Some(line_height)) = (origin, line_height) else {
            tracing::trace!(block = tab.block, run = tab.run, "tab geometry unavailable");
            summary.fallbacks += 1;
            return TabPlacement::with_width(self.fallback_width(format, surface));
        };

        let threshold = self.config.wrap_threshold * line_height;
        let line = classify(doc, surface, tab, origin, threshold);
        let mut wrap_start = false;
        if line == TabLine::Wrapped {
            summary.wrapped += 1;
            let same_line = tagged
                .is_some_and(|(block, y)| block == tab.block && (y - origin.y).abs() <= threshold);
            if !same_line {
                *tagged = Some((tab.block, origin.y));
                wrap_start = true;
            }
        }

        let stop = line
            .uses_stops()
            .then(|| stops.first_after(origin.x, self.config.min_stop_advance))
            .flatten();
        let needed = stop.and_then(|stop| {
            let needed = stop.position - origin.x;
            match stop.alignment {
                TabAlignment::Left => Some(needed),
                TabAlignment::Right => Some(needed - self.trailing_width(runs, tab.run, surface)?),
                TabAlignment::Center => {
                    Some(needed - self.trailing_width(runs, tab.run, surface)? / 2.0)
                }
            }
        });

        let width = match needed {
            Some(width) if width >= self.config.min_width => {
                summary.stopped += 1;
                width
            }
            _ => {
                summary.fallbacks += 1;
                self.fallback_width(format, surface)
            }
        };
        TabPlacement {
            width,
            line,
            wrap_start,
        }
    }

    /// Width of the content after the tab, up to the next tab, soft break, or
    /// the end of the block. `None` if any part cannot be measured.
    fn trailing_width(
        &mut self,
        runs: &[Run],
        tab_run: usize,
        surface: &mut impl LayoutSurface,
    ) -> Option<f32> {
        let mut width = 0.0;
        for run in &runs[tab_run + 1..] {
            width += match run {
                Run::Text { text, format } => self.cache.measure(text, format, surface)?,
                Run::Embed {
                    embed: Embed::Nbsp,
                    format,
                    ..
                } => self.cache.measure("\u{a0}", format, surface)?,
                Run::Embed { .. } => break,
            };
        }
        Some(width)
    }

    /// The width of the reference run in `format`, or the absolute fallback.
    /// Never below the minimum width.
    fn fallback_width(&mut self, format: &TextFormat, surface: &mut impl LayoutSurface) -> f32 {
        let width = self
            .cache
            .measure(&self.fallback_sample, format, surface)
            .filter(|w| *w > 0.0)
            .unwrap_or_else(|| {
                tracing::trace!("fallback reference run unavailable");
                self.config.absolute_fallback
            });
        width.max(self.config.min_width)
    }
}

/// Decide how the visual line holding `tab` began.
fn classify(
    doc: &Document,
    surface: &mut impl LayoutSurface,
    tab: TabHandle,
    origin: Point,
    threshold: f32,
) -> TabLine {
    if origin.y < threshold {
        return TabLine::FirstLine;
    }
    let runs = doc.blocks()[tab.block].runs();
    for run in (0..tab.run).rev() {
        if runs[run].is_embed(Embed::SoftBreak) {
            return TabLine::ExplicitBreak;
        }
        let Some(prev) = surface.run_origin(doc, tab.block, run) else {
            continue;
        };
        if (prev.y - origin.y).abs() > threshold {
            return TabLine::Wrapped;
        }
    }
    TabLine::FirstLine
}
