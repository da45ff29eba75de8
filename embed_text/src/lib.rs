// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embed Text is a small run-based rich text document model.
//!
//! A [`Document`] is a sequence of [`Block`]s (paragraphs), and each block is a
//! sequence of [`Run`]s. A run is either formatted text or an atomic [`Embed`]
//! (a tab, a soft line break, or a non-breaking space) with a stable [`EmbedId`].
//!
//! ## Offsets
//!
//! Positions are *linear offsets*: one unit per `char` of text, one unit per
//! embed, and one unit for the boundary that ends every block except the last.
//! A [`BlockPos`] is the same position expressed as a block index plus an offset
//! within that block.
//!
//! ## Plain text
//!
//! [`Document::from_plain_text`] and [`Document::to_plain_text`] map embeds to
//! characters: `\t` for tabs, U+2028 LINE SEPARATOR for soft breaks, U+00A0 for
//! non-breaking spaces, and `\n` for block boundaries.
//!
//! ```
//! use embed_text::{Document, Embed};
//!
//! let doc = Document::from_plain_text("Name\tValue\u{2028}\tNext\nSecond");
//! assert_eq!(doc.blocks().len(), 2);
//! assert_eq!(doc.count_embeds(Embed::Tab), 2);
//! assert_eq!(doc.to_plain_text(), "Name\tValue\u{2028}\tNext\nSecond");
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): This is currently unused and is provided for forward compatibility.
//! - `serde` (enabled by default): Serialization of formats and stored documents.
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
#![no_std]

extern crate alloc;

mod block;
mod document;
mod embed;
mod error;
mod format;
mod selection;

pub use crate::block::{Block, Run, Unit};
pub use crate::document::{BlockPos, Change, ChangeSource, Document, DocumentId, EmbedRef};
pub use crate::embed::{Embed, EmbedId};
pub use crate::error::{Error, ErrorKind};
pub use crate::format::TextFormat;
pub use crate::selection::Selection;

#[cfg(feature = "serde")]
pub use crate::document::StoredRun;
