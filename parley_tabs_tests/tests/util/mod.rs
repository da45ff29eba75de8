// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions and types shared across tests.

pub(crate) mod env;
mod host;

pub(crate) use env::{Editor, TestEnv};
pub(crate) use host::RecordingHost;

/// Returns the current function name (for use in test naming).
#[macro_export]
macro_rules! test_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        let name = &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..];

        name
    }};
}
