// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Font attributes of a run, as needed to measure it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TextFormat {
    /// Font family name.
    pub family: String,
    /// Font size in pixels.
    pub size: f32,
    /// Font weight, `400` is normal and `700` is bold.
    pub weight: u16,
    /// Whether the italic style is used.
    pub italic: bool,
    /// Extra spacing added after every character, in pixels.
    pub letter_spacing: f32,
}

impl TextFormat {
    /// Create a format for the given family and size with normal weight and style.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            ..Self::default()
        }
    }

    /// Returns this format with the given weight.
    #[must_use]
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    /// Returns this format with the italic style set.
    #[must_use]
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Returns this format with the given letter spacing.
    #[must_use]
    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            family: String::from("sans-serif"),
            size: 16.0,
            weight: 400,
            italic: false,
            letter_spacing: 0.0,
        }
    }
}
