// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Word processor style tab stops for rich text.
//!
//! Tabs in an [`embed_text::Document`] are atomic units whose rendered width
//! is derived on every layout pass: [`TabLayoutEngine`] walks the tabs in
//! document order and sizes each one so that the content after it lands on
//! the next [`TabStop`], honoring left, center, and right alignment. Tabs on
//! lines produced by automatic wrapping get a fixed fallback width instead.
//!
//! The engine reads geometry through the [`LayoutSurface`] trait.
//! [`SimpleFlow`] is a reference implementation over any [`TextMeasurer`].
//!
//! ```
//! use parley_tabs::embed_text::Document;
//! use parley_tabs::{
//!     FixedAdvance, FlowConfig, LayoutSurface, SimpleFlow, TabLayoutEngine, TabStopRegistry,
//! };
//!
//! let doc = Document::from_plain_text("Name\tValue");
//! let mut stops = TabStopRegistry::new();
//! stops.add(100.0);
//!
//! let mut surface = SimpleFlow::new(FixedAdvance::default(), FlowConfig::default());
//! let mut engine = TabLayoutEngine::default();
//! engine.recompute_layout(&doc, &stops, &mut surface);
//!
//! // "Name" is 32px wide, so the tab fills the rest of the way to the stop.
//! let tab = doc.embeds().next().unwrap();
//! assert_eq!(surface.tab_placement(tab.id).unwrap().width, 68.0);
//! ```
//!
//! [`TabEditor`] bundles a document, its stops, and key handling, and
//! coalesces layout passes into host frames through [`FrameHost`].
//!
//! ## Features
//!
//! - `serde` (enabled by default): JSON persistence of stops and configuration.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use embed_text;

mod config;
mod embed;
mod engine;
mod flow;
mod lru_cache;
mod measure;
mod stops;
mod surface;

pub mod editing;
pub mod widget;

pub use config::TabLayoutConfig;
pub use embed::{EmbedBox, TabLine, TabPlacement};
pub use engine::{PassSummary, TabLayoutEngine};
pub use flow::{FlowConfig, SimpleFlow};
pub use measure::{CacheStats, FixedAdvance, MeasureCache, TextMeasurer, DEFAULT_CACHE_CAPACITY};
pub use stops::{RulerEdit, TabAlignment, TabStop, TabStopRegistry};
pub use surface::{LayoutSurface, LineEnd, Point, VisualLine};
pub use widget::{FrameHost, FrameId, LayoutScheduler, LayoutTrigger, ListenerId, TabEditor};
