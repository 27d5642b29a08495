// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend [`PluginAdapter`] and use `#[async_trait]` so they can
//! be held as trait objects by the pipeline and the gateway.

pub mod adapter;
pub mod analyzer;
pub mod source;
pub mod storage;

pub use adapter::PluginAdapter;
pub use analyzer::AnalyzerAdapter;
pub use source::RecordSource;
pub use storage::StorageAdapter;
