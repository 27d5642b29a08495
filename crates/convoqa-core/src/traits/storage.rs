// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the warehouse backend.

use async_trait::async_trait;

use crate::error::ConvoqaError;
use crate::traits::adapter::PluginAdapter;

/// Lifecycle of the warehouse backend.
///
/// Query access goes through the backend's own typed handle; this trait only
/// covers opening (including schema migration) and orderly close.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), ConvoqaError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), ConvoqaError>;
}
