// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `parley_tabs`.
//!
//! - The `util` module holds the shared [`TestEnv`](util::TestEnv), which builds
//!   editors over a fixed-advance measurer and records frame requests.
//! - As in the other Parley test suites, this `mod.rs` file is the single entry
//!   point, so shared helpers need no separate crate.
//! - Put new tests into the module for their topic and start the test name with
//!   that topic, for example `soft_break_copies_up_to_stop_count`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod editor;
#[macro_use]
mod util;
