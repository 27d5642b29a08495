// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Convoqa analysis pipeline.

use thiserror::Error;

/// The primary error type used across all Convoqa adapters and pipeline stages.
#[derive(Debug, Error)]
pub enum ConvoqaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Warehouse errors (connection, query failure, migration, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// External analyzer errors (transport failure, non-2xx status, malformed verdict).
    #[error("analyzer error: {message}")]
    Analyzer {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ingestion errors raised by a record source or while persisting raw records.
    #[error("ingestion error: {message}")]
    Ingestion {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced warehouse row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvoqaError {
    /// Shorthand for an analyzer error without an underlying source.
    pub fn analyzer(message: impl Into<String>) -> Self {
        Self::Analyzer {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an ingestion error without an underlying source.
    pub fn ingestion(message: impl Into<String>) -> Self {
        Self::Ingestion {
            message: message.into(),
            source: None,
        }
    }
}
