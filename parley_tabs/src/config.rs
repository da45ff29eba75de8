// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::measure::DEFAULT_CACHE_CAPACITY;

/// Tunable constants of the tab layout engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TabLayoutConfig {
    /// Fraction of the line height beyond which two vertical positions are on
    /// different visual lines.
    pub wrap_threshold: f32,
    /// A stop must lie at least this far past the tab's start to be used.
    pub min_stop_advance: f32,
    /// Smallest width a tab is rendered with; smaller computed widths fall back.
    pub min_width: f32,
    /// Number of non-breaking spaces whose width is the fallback tab width.
    pub fallback_chars: usize,
    /// Fallback width used when the reference run cannot be measured.
    pub absolute_fallback: f32,
    /// Capacity of the measurement cache.
    pub cache_capacity: usize,
}

impl Default for TabLayoutConfig {
    fn default() -> Self {
        Self {
            wrap_threshold: 0.8,
            min_stop_advance: 2.0,
            min_width: 2.0,
            fallback_chars: 8,
            absolute_fallback: 32.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl TabLayoutConfig {
    /// The reference run measured for the fallback width.
    pub fn fallback_sample(&self) -> String {
        "\u{a0}".repeat(self.fallback_chars.max(1))
    }

    /// Load a configuration from JSON; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
