// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite warehouse for Convoqa.
//!
//! WAL-mode SQLite with embedded migrations, a single-writer model via
//! `tokio-rusqlite`, and typed query modules for conversations, messages,
//! dimensions, audit facts, tickets and daily snapshots.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
