// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement and the measurement cache.

use core::hash::{Hash, Hasher};

use embed_text::TextFormat;
use hashbrown::Equivalent;

use crate::lru_cache::{LookupKey, LruCache};

/// Default capacity of a [`MeasureCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Something that can measure the advance width of a run of text.
pub trait TextMeasurer {
    /// Width in pixels of `text` rendered with `format`.
    ///
    /// Returns `None` when the measurement is unavailable, for example on a
    /// detached or hidden surface.
    fn measure_text(&mut self, text: &str, format: &TextFormat) -> Option<f32>;
}

/// A measurer where every character advances by a fixed fraction of the font size.
///
/// Useful for headless hosts and for tests, where real font metrics are not
/// available. Bold text (weight 600 and above) is 10% wider.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Advance of one character, in ems.
    pub advance_em: f32,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self { advance_em: 0.5 }
    }
}

impl TextMeasurer for FixedAdvance {
    fn measure_text(&mut self, text: &str, format: &TextFormat) -> Option<f32> {
        if !format.size.is_finite() || format.size <= 0.0 {
            return None;
        }
        let bold = if format.weight >= 600 { 1.1 } else { 1.0 };
        let advance = format.size * self.advance_em * bold + format.letter_spacing;
        let count = text.chars().count() as f32;
        Some(advance * count)
    }
}

/// Owned cache key: the exact text plus every font attribute that affects width.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    family: String,
    size: u32,
    weight: u16,
    italic: bool,
    letter_spacing: u32,
}

/// Borrowed form of [`MeasureKey`]. Must hash exactly like it.
struct MeasureLookup<'a> {
    text: &'a str,
    format: &'a TextFormat,
}

impl Hash for MeasureLookup<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.format.family.as_str().hash(state);
        self.format.size.to_bits().hash(state);
        self.format.weight.hash(state);
        self.format.italic.hash(state);
        self.format.letter_spacing.to_bits().hash(state);
    }
}

impl Equivalent<MeasureKey> for MeasureLookup<'_> {
    fn equivalent(&self, key: &MeasureKey) -> bool {
        self.text == key.text
            && self.format.family == key.family
            && self.format.size.to_bits() == key.size
            && self.format.weight == key.weight
            && self.format.italic == key.italic
            && self.format.letter_spacing.to_bits() == key.letter_spacing
    }
}

impl LookupKey<MeasureKey> for MeasureLookup<'_> {
    fn to_key(&self) -> MeasureKey {
        MeasureKey {
            text: self.text.to_owned(),
            family: self.format.family.clone(),
            size: self.format.size.to_bits(),
            weight: self.format.weight,
            italic: self.format.italic,
            letter_spacing: self.format.letter_spacing.to_bits(),
        }
    }
}

/// Hit and miss counters of a [`MeasureCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to call the measurer.
    pub misses: u64,
}

/// Memoized text widths keyed by text and font attributes.
///
/// Font metrics do not depend on the viewport, so the cache is never
/// invalidated by a resize; it is only bounded, evicting the least recently
/// used entry when full, and cleared when its owner is torn down.
pub struct MeasureCache {
    cache: LruCache<MeasureKey, f32>,
    stats: CacheStats,
}

impl core::fmt::Debug for MeasureCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MeasureCache")
            .field("len", &self.cache.len())
            .field("capacity", &self.cache.capacity())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for MeasureCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl MeasureCache {
    /// Create a cache holding at most `capacity` widths.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Width of `text` in `format`, measured with `measurer` on a cache miss.
    ///
    /// Failed or non-finite measurements are returned as `None` and not cached.
    pub fn measure(
        &mut self,
        text: &str,
        format: &TextFormat,
        measurer: &mut (impl TextMeasurer + ?Sized),
    ) -> Option<f32> {
        if text.is_empty() {
            return Some(0.0);
        }
        let lookup = MeasureLookup { text, format };
        let mut missed = false;
        let width = self.cache.entry(&lookup, || {
            missed = true;
            measurer
                .measure_text(text, format)
                .filter(|width| width.is_finite() && *width >= 0.0)
        });
        if missed {
            self.stats.misses += 1;
        } else {
            self.stats.hits += 1;
        }
        width
    }

    /// Returns `true` if a width for `text` in `format` is cached.
    pub fn contains(&self, text: &str, format: &TextFormat) -> bool {
        self.cache.contains(&MeasureLookup { text, format })
    }

    /// Number of cached widths.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.len() == 0
    }

    /// Maximum number of cached widths.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Hit and miss counters since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every cached width.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats = CacheStats::default();
    }
}
