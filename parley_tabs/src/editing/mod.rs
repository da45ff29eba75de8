// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key handling for tabs and soft breaks.

mod controller;
mod keymap;

pub use self::controller::*;
pub use self::keymap::*;
