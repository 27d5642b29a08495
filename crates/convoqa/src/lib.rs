// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring for the `convoqa` binary: adapter construction and the
//! subcommand implementations, exposed so integration tests can drive them.

pub mod commands;
pub mod runtime;
pub mod serve;

pub use runtime::Runtime;
