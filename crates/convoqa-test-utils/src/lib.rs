// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Convoqa integration tests.
//!
//! Provides mock adapters and a temp-database harness so pipeline and
//! gateway tests run without an analyzer service or upstream platform.
//!
//! # Components
//!
//! - [`MockAnalyzer`] - Analyzer with a FIFO of scripted verdicts and failures
//! - [`MockSource`] - Record source backed by in-memory conversations
//! - [`TestHarness`] - Temp SQLite warehouse with seeding helpers

pub mod harness;
pub mod mock_analyzer;
pub mod mock_source;

pub use harness::TestHarness;
pub use mock_analyzer::{MockAnalyzer, verdict};
pub use mock_source::MockSource;
